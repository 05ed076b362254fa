use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::ingest::types::{ChatSource, Page, PageRequest};

/// Replays a scripted list of pages in order. Once the script runs out every
/// further fetch fails with `SourceError::Unavailable`.
pub struct FixtureChatSource {
    pages: Vec<Page>,
    state: Mutex<FixtureState>,
}

#[derive(Default)]
struct FixtureState {
    next: usize,
    requested_tokens: Vec<Option<String>>,
}

impl FixtureChatSource {
    pub fn from_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            state: Mutex::new(FixtureState::default()),
        }
    }

    /// JSON array of pages, e.g. `[{"items": [...], "nextPageToken": "X"}]`.
    pub fn from_json_str(s: &str) -> Result<Self, SourceError> {
        let pages: Vec<Page> = serde_json::from_str(s)?;
        Ok(Self::from_pages(pages))
    }

    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Unavailable(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&s)
    }

    /// Page tokens seen so far, in request order.
    pub fn requested_tokens(&self) -> Vec<Option<String>> {
        self.state
            .lock()
            .map(|s| s.requested_tokens.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ChatSource for FixtureChatSource {
    async fn fetch_page(&self, req: PageRequest<'_>) -> Result<Page, SourceError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| SourceError::Unavailable("fixture state poisoned".into()))?;
        state
            .requested_tokens
            .push(req.page_token.map(str::to_string));

        let page = self
            .pages
            .get(state.next)
            .cloned()
            .ok_or_else(|| SourceError::Unavailable("fixture exhausted".into()))?;
        state.next += 1;
        Ok(page)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_then_fails() {
        let src = FixtureChatSource::from_json_str(r#"[{"items": [{}], "nextPageToken": "X"}]"#)
            .unwrap();
        let req = PageRequest {
            stream_id: "s",
            page_token: None,
            page_size_hint: 10,
        };
        let page = src.fetch_page(req).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(matches!(
            src.fetch_page(req).await,
            Err(SourceError::Unavailable(_))
        ));
        assert_eq!(src.requested_tokens(), vec![None, None]);
    }
}
