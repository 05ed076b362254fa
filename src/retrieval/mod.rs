// src/retrieval/mod.rs
//! Transcript retrieval: chunk the source text, rank chunks against a query,
//! hand the top hits to a response generator.

pub mod chunker;
pub mod lexical;
pub mod prompt;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ChunkError;

pub use chunker::{chunk, Chunk, DEFAULT_CHUNK_SIZE};
pub use lexical::{lexical_score, rank, LexicalIndex, DEFAULT_TOP_K};
pub use prompt::{build_prompt, DynGenerator, ResponseGenerator, StubGenerator};

/// Chunks in descending relevance.
pub type RankedResult = Vec<Chunk>;

/// Ranking capability. Implementations must be pure for a given input.
pub trait SimilarityIndex: Send + Sync {
    fn rank(&self, chunks: &[Chunk], query: &str, k: usize) -> RankedResult;
    fn name(&self) -> &'static str;
}

/// Which `SimilarityIndex` to build; chosen in config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    #[default]
    Lexical,
}

impl IndexBackend {
    pub fn build(self) -> Arc<dyn SimilarityIndex> {
        match self {
            IndexBackend::Lexical => Arc::new(LexicalIndex),
        }
    }
}

/// Chunker + index with a fixed chunk size.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<dyn SimilarityIndex>,
    chunk_size: usize,
}

impl Retriever {
    pub fn new(index: Arc<dyn SimilarityIndex>, chunk_size: usize) -> Self {
        Self { index, chunk_size }
    }

    pub fn index_name(&self) -> &'static str {
        self.index.name()
    }

    pub fn retrieve(
        &self,
        source_text: &str,
        query: &str,
        k: usize,
    ) -> Result<RankedResult, ChunkError> {
        let chunks = chunk(source_text, self.chunk_size)?;
        let ranked = self.index.rank(&chunks, query, k);
        tracing::debug!(
            index = self.index.name(),
            chunks = chunks.len(),
            returned = ranked.len(),
            "retrieval done"
        );
        Ok(ranked)
    }

    /// retrieve → prompt → generator.
    pub async fn answer(
        &self,
        generator: &dyn ResponseGenerator,
        source_text: &str,
        question: &str,
        k: usize,
    ) -> Result<String, ChunkError> {
        let hits = self.retrieve(source_text, question, k)?;
        let prompt = build_prompt(&hits, question);
        tracing::info!(generator = generator.name(), hits = hits.len(), "generating answer");
        Ok(generator.generate(&prompt).await)
    }
}

impl Default for Retriever {
    fn default() -> Self {
        Self::new(IndexBackend::default().build(), DEFAULT_CHUNK_SIZE)
    }
}

/// Lexical retrieval with the default chunk size.
pub fn retrieve(source_text: &str, query: &str, k: usize) -> RankedResult {
    // DEFAULT_CHUNK_SIZE is non-zero, so chunking cannot fail here.
    let chunks = chunk(source_text, DEFAULT_CHUNK_SIZE).unwrap_or_default();
    rank(&chunks, query, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retrieve_picks_matching_window() {
        let text = format!("{}{}", "a ".repeat(500), "needle in here ".repeat(10));
        let hits = retrieve(&text, "needle", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].origin_offset, 1000);
    }

    #[test]
    fn retriever_rejects_zero_chunk_size() {
        let r = Retriever::new(IndexBackend::Lexical.build(), 0);
        assert_eq!(r.retrieve("abc", "a", 1), Err(ChunkError::ZeroSize));
    }

    #[test]
    fn backend_parses_from_lowercase() {
        let b: IndexBackend = serde_json::from_str(r#""lexical""#).unwrap();
        assert_eq!(b, IndexBackend::Lexical);
        assert_eq!(b.build().name(), "lexical");
    }
}
