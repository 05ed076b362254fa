// src/store/mod.rs
//! Optional external keyed store. The ingest path only ever sees it through
//! `Option<SharedStore>`; every failure stays on this side of the seam.

pub mod chroma;

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::error::WriteError;

/// Collection every chat message is written to.
pub const CHAT_COLLECTION: &str = "yt_chat";

#[async_trait::async_trait]
pub trait ExternalStore: Send + Sync {
    /// Add documents with parallel `ids` and `metadatas`.
    async fn add(
        &self,
        ids: Vec<String>,
        documents: Vec<String>,
        metadatas: Vec<Value>,
    ) -> Result<(), WriteError>;

    fn name(&self) -> &'static str;
}

pub type SharedStore = Arc<dyn ExternalStore>;

/// One `add` call as seen by `RecordingStore`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBatch {
    pub ids: Vec<String>,
    pub documents: Vec<String>,
    pub metadatas: Vec<Value>,
}

// --- Test helper ---
/// In-memory store that records every batch. Used by tests and `--fixture` demos.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub calls: Mutex<Vec<StoredBatch>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> Vec<StoredBatch> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl ExternalStore for RecordingStore {
    async fn add(
        &self,
        ids: Vec<String>,
        documents: Vec<String>,
        metadatas: Vec<Value>,
    ) -> Result<(), WriteError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(StoredBatch {
                ids,
                documents,
                metadatas,
            });
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
