use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::OnceCell;

use super::ExternalStore;
use crate::error::WriteError;

/// Chroma-compatible HTTP store. Resolves the collection id once and caches it.
pub struct ChromaStore {
    base_url: String,
    collection: String,
    client: Client,
    timeout: Duration,
    collection_id: OnceCell<String>,
}

#[derive(Serialize)]
struct CreateCollection<'a> {
    name: &'a str,
    get_or_create: bool,
}

#[derive(Deserialize)]
struct CollectionResp {
    id: Option<String>,
}

#[derive(Serialize)]
struct AddReq<'a> {
    ids: &'a [String],
    documents: &'a [String],
    metadatas: &'a [Value],
}

impl ChromaStore {
    pub fn new(base_url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            client: Client::new(),
            timeout: Duration::from_secs(5),
            collection_id: OnceCell::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn collection_id(&self) -> Result<&str, WriteError> {
        let id = self
            .collection_id
            .get_or_try_init(|| self.create_collection())
            .await?;
        Ok(id.as_str())
    }

    async fn create_collection(&self) -> Result<String, WriteError> {
        let url = format!("{}/api/v1/collections", self.base_url);
        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&CreateCollection {
                name: &self.collection,
                get_or_create: true,
            })
            .send()
            .await?;
        let body: CollectionResp = check_status(rsp).await?.json().await?;
        body.id.ok_or(WriteError::MissingField("id"))
    }
}

async fn check_status(rsp: reqwest::Response) -> Result<reqwest::Response, WriteError> {
    let status = rsp.status();
    if status.is_success() {
        return Ok(rsp);
    }
    let body = rsp.text().await.unwrap_or_default();
    Err(WriteError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait::async_trait]
impl ExternalStore for ChromaStore {
    async fn add(
        &self,
        ids: Vec<String>,
        documents: Vec<String>,
        metadatas: Vec<Value>,
    ) -> Result<(), WriteError> {
        let collection_id = self.collection_id().await?;
        let url = format!(
            "{}/api/v1/collections/{}/add",
            self.base_url, collection_id
        );
        let rsp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&AddReq {
                ids: &ids,
                documents: &documents,
                metadatas: &metadatas,
            })
            .send()
            .await?;
        check_status(rsp).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "chroma"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let s = ChromaStore::new("http://localhost:8000/", "yt_chat");
        assert_eq!(s.base_url, "http://localhost:8000");
        assert_eq!(s.collection(), "yt_chat");
    }

    #[tokio::test]
    async fn unreachable_store_returns_error() {
        // Port 9 (discard) is closed on test hosts; connect fails fast.
        let s = ChromaStore::new("http://127.0.0.1:9", "yt_chat")
            .with_timeout(Duration::from_millis(500));
        let res = s
            .add(vec!["a".into()], vec!["b".into()], vec![Value::Null])
            .await;
        assert!(res.is_err());
    }
}
