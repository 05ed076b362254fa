// src/ingest/types.rs
use serde::{Deserialize, Serialize};

use crate::error::SourceError;

/// Who wrote a chat message. Both fields are optional upstream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub name: Option<String>,
    pub id: Option<String>,
}

/// One normalized chat message. Never mutated after `from_raw`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub id: Option<String>,
    pub author: Author,
    pub text: Option<String>,
    /// ISO-8601-ish publish time, kept opaque.
    pub timestamp: Option<String>,
}

impl Message {
    /// Build a message from a raw page item. Missing fields stay `None`.
    pub fn from_raw(item: &RawItem) -> Self {
        let snippet = item.snippet.as_ref();
        let details = item.author_details.as_ref();

        let text = snippet.and_then(|s| {
            s.display_message
                .clone()
                .filter(|t| !t.is_empty())
                .or_else(|| {
                    s.text_message_details
                        .as_ref()
                        .and_then(|d| d.message_text.clone())
                })
        });

        Self {
            id: item.id.clone(),
            author: Author {
                name: details.and_then(|d| d.display_name.clone()),
                id: details.and_then(|d| d.channel_id.clone()),
            },
            text,
            timestamp: snippet.and_then(|s| s.published_at.clone()),
        }
    }

    pub fn text_or_empty(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

/// Raw item as delivered by the live chat API. Every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawItem {
    pub id: Option<String>,
    pub snippet: Option<RawSnippet>,
    pub author_details: Option<RawAuthorDetails>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSnippet {
    pub display_message: Option<String>,
    pub text_message_details: Option<RawTextDetails>,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTextDetails {
    pub message_text: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAuthorDetails {
    pub display_name: Option<String>,
    pub channel_id: Option<String>,
}

/// Request for one page of the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest<'a> {
    pub stream_id: &'a str,
    /// `None` on the first call and after a reset to live.
    pub page_token: Option<&'a str>,
    pub page_size_hint: u32,
}

/// One page of the stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Page {
    pub items: Vec<RawItem>,
    /// `None` means the stream has ended.
    pub next_page_token: Option<String>,
    pub suggested_delay_ms: Option<u64>,
}

/// Paginated chat source (the live chat API or a scripted fixture).
#[async_trait::async_trait]
pub trait ChatSource: Send + Sync {
    async fn fetch_page(&self, req: PageRequest<'_>) -> Result<Page, SourceError>;
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_prefers_display_message() {
        let raw: RawItem = serde_json::from_str(
            r#"{
                "id": "m1",
                "snippet": {
                    "displayMessage": "hello",
                    "textMessageDetails": {"messageText": "ignored"},
                    "publishedAt": "2024-01-01T00:00:00Z"
                },
                "authorDetails": {"displayName": "Ann", "channelId": "UC1"}
            }"#,
        )
        .unwrap();
        let m = Message::from_raw(&raw);
        assert_eq!(m.id.as_deref(), Some("m1"));
        assert_eq!(m.text.as_deref(), Some("hello"));
        assert_eq!(m.author.name.as_deref(), Some("Ann"));
        assert_eq!(m.author.id.as_deref(), Some("UC1"));
        assert_eq!(m.timestamp.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn from_raw_falls_back_to_message_text() {
        let raw: RawItem = serde_json::from_str(
            r#"{"snippet": {"textMessageDetails": {"messageText": "fallback"}}}"#,
        )
        .unwrap();
        assert_eq!(Message::from_raw(&raw).text.as_deref(), Some("fallback"));
    }

    #[test]
    fn empty_display_message_falls_back() {
        let raw: RawItem = serde_json::from_str(
            r#"{"snippet": {"displayMessage": "", "textMessageDetails": {"messageText": "sticker"}}}"#,
        )
        .unwrap();
        assert_eq!(Message::from_raw(&raw).text.as_deref(), Some("sticker"));
    }

    #[test]
    fn from_raw_tolerates_empty_item() {
        let raw: RawItem = serde_json::from_str("{}").unwrap();
        let m = Message::from_raw(&raw);
        assert_eq!(m, Message::default());
        assert_eq!(m.text_or_empty(), "");
    }
}
