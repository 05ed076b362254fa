//! # Message Handlers
//! Per-message steps run by the polling engine, in this order:
//! `score` → `append_to_history` → `write_best_effort`.
//!
//! The handlers share no state beyond what is passed in.

use std::time::Duration;

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::WriteError;
use crate::history::HistoryBuffer;
use crate::ingest::types::Message;
use crate::store::SharedStore;

/// Messages longer than this many characters get the length bonus.
pub const LONG_MESSAGE_CHARS: usize = 100;
const LONG_MESSAGE_BONUS: f64 = 0.5;
const EXCLAMATION_BONUS: f64 = 0.2;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: f64,
    /// Reserved for classification; currently always empty.
    pub tags: Vec<String>,
}

/// Heuristic score from the message text alone.
pub fn score(msg: &Message) -> ScoreResult {
    let text = msg.text_or_empty();
    let mut score = 0.0;
    if text.chars().count() > LONG_MESSAGE_CHARS {
        score += LONG_MESSAGE_BONUS;
    }
    if text.contains('!') {
        score += EXCLAMATION_BONUS;
    }
    ScoreResult {
        score,
        tags: Vec::new(),
    }
}

/// Push a copy of `msg` into the session history (oldest entries evicted).
pub fn append_to_history(msg: &Message, history: &mut HistoryBuffer) {
    history.push(Message {
        id: msg.id.clone(),
        author: msg.author.clone(),
        text: msg.text.clone(),
        timestamp: msg.timestamp.clone(),
    });
}

/// Persist `msg` into the external store if one is configured.
///
/// Never fails and never waits longer than `timeout`: an absent store is a
/// no-op, and connection errors, rejections and timeouts are only logged.
pub async fn write_best_effort(msg: &Message, store: Option<&SharedStore>, timeout: Duration) {
    let Some(store) = store else {
        return;
    };

    let id = msg.id.clone().unwrap_or_else(surrogate_id);
    if let Err(e) = store_write(msg, &id, store, timeout).await {
        tracing::debug!(error = %e, store = store.name(), id = %id, "store write skipped");
        counter!("chat_store_errors_total").increment(1);
    }
}

/// One `add` call into `yt_chat`, bounded by `timeout`.
async fn store_write(
    msg: &Message,
    id: &str,
    store: &SharedStore,
    timeout: Duration,
) -> Result<(), WriteError> {
    let document = msg.text_or_empty().to_string();
    let metadata = json!({
        "author": msg.author.name.clone().unwrap_or_default(),
        "time": msg.timestamp.clone().unwrap_or_default(),
    });

    let write = store.add(vec![id.to_string()], vec![document], vec![metadata]);
    tokio::time::timeout(timeout, write)
        .await
        .map_err(|_| WriteError::Timeout(timeout.as_millis() as u64))?
}

/// Time-based id for messages that arrive without one: `secs.micros`.
fn surrogate_id() -> String {
    let now = chrono::Utc::now();
    format!("{}.{:06}", now.timestamp(), now.timestamp_subsec_micros())
}
