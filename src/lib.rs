// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod handlers;
pub mod history;
pub mod ingest;
pub mod metrics;
pub mod retrieval;
pub mod store;
pub mod transcript;

// ---- Re-exports for stable public API ----
pub use crate::error::{ChunkError, SourceError, WriteError};
pub use crate::handlers::{append_to_history, score, write_best_effort, ScoreResult};
pub use crate::history::HistoryBuffer;
pub use crate::ingest::types::{Author, ChatSource, Message, Page, PageRequest, RawItem};
pub use crate::ingest::{Observation, PollState, PollSummary, PollerCfg, PollingEngine, StopReason};
pub use crate::retrieval::{retrieve, Chunk, RankedResult, Retriever, SimilarityIndex};
pub use crate::store::{ExternalStore, SharedStore};

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::store::chroma::ChromaStore;

/// Build the optional store from config. Missing or disabled config yields
/// `None`, which the ingest path treats as "nothing to write to".
pub fn build_store(cfg: &AppConfig) -> Option<SharedStore> {
    if !cfg.store.enabled {
        return None;
    }
    let Some(url) = cfg.store.url.as_deref().filter(|u| !u.trim().is_empty()) else {
        tracing::info!("store enabled but no url configured; writes disabled");
        return None;
    };
    let store = ChromaStore::new(url, cfg.store.collection.clone())
        .with_timeout(Duration::from_millis(cfg.store.timeout_ms));
    Some(Arc::new(store))
}

/// Retriever wired from the `[retrieval]` section.
pub fn build_retriever(cfg: &AppConfig) -> Retriever {
    Retriever::new(cfg.retrieval.backend.build(), cfg.retrieval.chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_requires_enabled_and_url() {
        let mut cfg = AppConfig::default();
        assert!(build_store(&cfg).is_none());

        cfg.store.enabled = true;
        assert!(build_store(&cfg).is_none());

        cfg.store.url = Some("http://localhost:8000".into());
        let store = build_store(&cfg).unwrap();
        assert_eq!(store.name(), "chroma");
    }

    #[test]
    fn retriever_follows_config() {
        let r = build_retriever(&AppConfig::default());
        assert_eq!(r.index_name(), "lexical");
    }
}
