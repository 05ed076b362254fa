// src/transcript.rs
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Segment {
    text: String,
}

/// Load a transcript. `.json` = array of `{ "text": ... }` segments joined by
/// single spaces; anything else is read as plain text.
pub fn load_transcript(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading transcript from {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let text = if is_json {
        join_segments(&content)?
    } else {
        content
    };

    if text.trim().is_empty() {
        bail!("transcript at {} is empty", path.display());
    }
    Ok(text)
}

fn join_segments(s: &str) -> Result<String> {
    let segments: Vec<Segment> = serde_json::from_str(s).context("parsing transcript segments")?;
    Ok(segments
        .into_iter()
        .map(|seg| seg.text)
        .collect::<Vec<_>>()
        .join(" "))
}
