//! Prompt assembly and the response generator seam.
//! Real model calls live outside this crate; `StubGenerator` is the local stand-in.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::chunker::Chunk;

const SYSTEM_TEMPLATE: &str =
    "You are a helpful assistant that answers questions based on the following video transcript:\n\n";

/// Context = chunk contents separated by a blank line.
pub fn build_context(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(|c| c.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn build_prompt(chunks: &[Chunk], question: &str) -> String {
    format!("{SYSTEM_TEMPLATE}{}\n\n{question}", build_context(chunks))
}

pub trait ResponseGenerator: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> Pin<Box<dyn Future<Output = String> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

pub type DynGenerator = Arc<dyn ResponseGenerator>;

/// Echoes the prompt back; used when no model is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubGenerator;

impl ResponseGenerator for StubGenerator {
    fn generate<'a>(&'a self, prompt: &'a str) -> Pin<Box<dyn Future<Output = String> + Send + 'a>> {
        Box::pin(async move {
            format!("[stub model] GenAI not available locally.\nPrompt was:\n{prompt}")
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}
