use std::time::Duration;

use async_trait::async_trait;
use metrics::histogram;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use crate::error::SourceError;
use crate::ingest::types::{ChatSource, Page, PageRequest, RawItem};

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChatResp {
    #[serde(default)]
    items: Vec<RawItem>,
    next_page_token: Option<String>,
    polling_interval_millis: Option<u64>,
    /// Present once the broadcast's chat has gone offline.
    offline_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosResp {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    live_streaming_details: Option<LiveDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveDetails {
    active_live_chat_id: Option<String>,
}

/// Live chat API client. Credentials are issued elsewhere; this only sends them.
pub struct YouTubeChatSource {
    http: Client,
    api_base: String,
    api_key: Option<String>,
    access_token: Option<String>,
}

impl YouTubeChatSource {
    pub fn new(
        api_base: &str,
        api_key: Option<String>,
        access_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent(concat!("live-chat-analyzer/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            access_token: access_token.filter(|t| !t.is_empty()),
        })
    }

    fn authorized(&self, rb: RequestBuilder) -> RequestBuilder {
        let rb = match &self.api_key {
            Some(key) => rb.query(&[("key", key.as_str())]),
            None => rb,
        };
        match &self.access_token {
            Some(token) => rb.bearer_auth(token),
            None => rb,
        }
    }

    async fn get_text(&self, rb: RequestBuilder) -> Result<String, SourceError> {
        let rsp = self.authorized(rb).send().await?;
        let status = rsp.status();
        let body = rsp.text().await?;
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Look up the active live chat of a video.
    pub async fn resolve_live_chat_id(&self, video_id: &str) -> Result<String, SourceError> {
        let url = format!("{}/videos", self.api_base);
        let rb = self
            .http
            .get(&url)
            .query(&[("part", "liveStreamingDetails"), ("id", video_id)]);
        let body = self.get_text(rb).await?;
        parse_live_chat_id(&body)?.ok_or_else(|| SourceError::NoLiveChat(video_id.to_string()))
    }
}

fn parse_live_chat_id(body: &str) -> Result<Option<String>, SourceError> {
    let rsp: VideosResp = serde_json::from_str(body)?;
    Ok(rsp
        .items
        .into_iter()
        .next()
        .and_then(|v| v.live_streaming_details)
        .and_then(|d| d.active_live_chat_id))
}

/// Map the API payload onto a `Page`. An offline chat has no next page.
fn parse_page(body: &str) -> Result<Page, SourceError> {
    let rsp: ChatResp = serde_json::from_str(body)?;
    let next_page_token = if rsp.offline_at.is_some() {
        None
    } else {
        rsp.next_page_token
    };
    Ok(Page {
        items: rsp.items,
        next_page_token,
        suggested_delay_ms: rsp.polling_interval_millis,
    })
}

#[async_trait]
impl ChatSource for YouTubeChatSource {
    async fn fetch_page(&self, req: PageRequest<'_>) -> Result<Page, SourceError> {
        let t0 = std::time::Instant::now();
        let url = format!("{}/liveChat/messages", self.api_base);
        let max_results = req.page_size_hint.to_string();
        let mut rb = self.http.get(&url).query(&[
            ("liveChatId", req.stream_id),
            ("part", "snippet,authorDetails"),
            ("maxResults", max_results.as_str()),
        ]);
        if let Some(token) = req.page_token {
            rb = rb.query(&[("pageToken", token)]);
        }

        let body = self.get_text(rb).await?;
        let page = parse_page(&body)?;

        histogram!("chat_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Ok(page)
    }

    fn name(&self) -> &'static str {
        "youtube"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_page_maps_fields() {
        let body = r#"{
            "nextPageToken": "X",
            "pollingIntervalMillis": 5000,
            "items": [
                {"id": "a", "snippet": {"displayMessage": "hi"}, "authorDetails": {"displayName": "Ann"}},
                {"id": "b"}
            ]
        }"#;
        let page = parse_page(body).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("X"));
        assert_eq!(page.suggested_delay_ms, Some(5000));
    }

    #[test]
    fn offline_chat_ends_stream() {
        let body = r#"{"nextPageToken": "X", "offlineAt": "2024-01-01T00:00:00Z", "items": []}"#;
        let page = parse_page(body).unwrap();
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn missing_items_is_empty_page() {
        let page = parse_page("{}").unwrap();
        assert!(page.items.is_empty());
        assert!(page.suggested_delay_ms.is_none());
    }

    #[test]
    fn live_chat_id_lookup() {
        let found = r#"{"items": [{"liveStreamingDetails": {"activeLiveChatId": "LC1"}}]}"#;
        assert_eq!(parse_live_chat_id(found).unwrap().as_deref(), Some("LC1"));

        let not_live = r#"{"items": [{"liveStreamingDetails": {}}]}"#;
        assert!(parse_live_chat_id(not_live).unwrap().is_none());

        assert!(parse_live_chat_id(r#"{"items": []}"#).unwrap().is_none());
        assert!(parse_live_chat_id("not json").is_err());
    }

    #[test]
    fn empty_credentials_are_dropped() {
        let s = YouTubeChatSource::new(
            "https://example.test/v3/",
            Some(String::new()),
            None,
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(s.api_key.is_none());
        assert_eq!(s.api_base, "https://example.test/v3");
    }
}
