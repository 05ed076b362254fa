// src/ingest/mod.rs
//! Polling engine: pulls pages from a `ChatSource` in cursor order, runs every
//! item through the handlers and emits one `Observation` per message.

pub mod providers;
pub mod types;

use std::fmt;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::SourceError;
use crate::handlers::{self, ScoreResult};
use crate::history::{HistoryBuffer, DEFAULT_HISTORY_CAPACITY};
use crate::ingest::types::{ChatSource, Message, Page, PageRequest, RawItem};
use crate::store::SharedStore;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("chat_pages_total", "Pages fetched from the chat source.");
        describe_counter!("chat_messages_total", "Messages dispatched to handlers.");
        describe_counter!(
            "chat_fetch_errors_total",
            "Page fetches that failed and ended the session."
        );
        describe_counter!(
            "chat_store_errors_total",
            "Best-effort store writes that failed or timed out."
        );
        describe_histogram!("chat_fetch_ms", "Live chat API fetch time in milliseconds.");
        describe_histogram!("chat_poll_delay_ms", "Delay before the next poll in milliseconds.");
        describe_gauge!("chat_history_len", "Messages currently held in session history.");
    });
}

#[derive(Clone, Copy, Debug)]
pub struct PollerCfg {
    pub page_size_hint: u32,
    /// Lower bound for the inter-poll delay.
    pub min_delay: Duration,
    /// Used when the source suggests no delay.
    pub default_delay: Duration,
    /// 0 = unbounded.
    pub max_iterations: u64,
    pub history_capacity: usize,
    pub store_timeout: Duration,
}

impl Default for PollerCfg {
    fn default() -> Self {
        Self {
            page_size_hint: 200,
            min_delay: Duration::from_millis(100),
            default_delay: Duration::from_millis(2000),
            max_iterations: 0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            store_timeout: Duration::from_secs(2),
        }
    }
}

impl PollerCfg {
    /// `max(min_delay, suggested)`, falling back to `default_delay`.
    pub fn next_delay(&self, suggested_ms: Option<u64>) -> Duration {
        let suggested = suggested_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_delay);
        suggested.max(self.min_delay)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Starting,
    Polling,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    Cancelled,
    IterationLimit,
    StreamEnded,
}

/// What the engine exposes for every processed message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp: Option<String>,
    pub author_name: Option<String>,
    pub text: Option<String>,
    pub score: f64,
}

impl Observation {
    pub fn new(msg: &Message, score: &ScoreResult) -> Self {
        Self {
            timestamp: msg.timestamp.clone(),
            author_name: msg.author.name.clone(),
            text: msg.text.clone(),
            score: score.score,
        }
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} -- score={}",
            self.timestamp.as_deref().unwrap_or("-"),
            self.author_name.as_deref().unwrap_or("?"),
            self.text.as_deref().unwrap_or_default(),
            self.score
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    pub pages: u64,
    pub messages: u64,
    pub stop: StopReason,
}

/// Single-session poller. Owns its history; nothing here is shared.
pub struct PollingEngine {
    source: Box<dyn ChatSource>,
    stream_id: String,
    cfg: PollerCfg,
    store: Option<SharedStore>,
    history: HistoryBuffer,
    cursor: Option<String>,
    state: PollState,
}

impl PollingEngine {
    pub fn new(source: Box<dyn ChatSource>, stream_id: impl Into<String>, cfg: PollerCfg) -> Self {
        Self {
            source,
            stream_id: stream_id.into(),
            cfg,
            store: None,
            history: HistoryBuffer::with_capacity(cfg.history_capacity),
            cursor: None,
            state: PollState::Starting,
        }
    }

    pub fn with_store(mut self, store: Option<SharedStore>) -> Self {
        self.store = store;
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Poll until cancelled, the iteration bound is hit, or the stream ends.
    ///
    /// A fetch error stops the session and is returned as-is (no retry).
    pub async fn run<F>(
        &mut self,
        cancel: &CancellationToken,
        mut emit: F,
    ) -> Result<PollSummary, SourceError>
    where
        F: FnMut(&Observation),
    {
        ensure_metrics_described();
        self.state = PollState::Starting;
        self.cursor = None;

        tracing::info!(
            source = self.source.name(),
            stream_id = %self.stream_id,
            max_iterations = self.cfg.max_iterations,
            "polling started"
        );

        let mut pages = 0u64;
        let mut messages = 0u64;

        let stop = loop {
            if cancel.is_cancelled() {
                break StopReason::Cancelled;
            }

            let page = match self.fetch(cancel).await {
                Some(Ok(page)) => page,
                Some(Err(e)) => {
                    self.state = PollState::Stopped;
                    counter!("chat_fetch_errors_total").increment(1);
                    tracing::warn!(error = %e, source = self.source.name(), "page fetch failed");
                    return Err(e);
                }
                None => break StopReason::Cancelled,
            };

            self.state = PollState::Polling;
            pages += 1;
            counter!("chat_pages_total").increment(1);

            for item in &page.items {
                let obs = self.dispatch(item).await;
                messages += 1;
                emit(&obs);
            }

            self.cursor = page.next_page_token;
            if self.cursor.is_none() {
                break StopReason::StreamEnded;
            }
            if self.cfg.max_iterations > 0 && pages >= self.cfg.max_iterations {
                break StopReason::IterationLimit;
            }

            let delay = self.cfg.next_delay(page.suggested_delay_ms);
            histogram!("chat_poll_delay_ms").record(delay.as_secs_f64() * 1_000.0);
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break StopReason::Cancelled,
                _ = tokio::time::sleep(delay) => {}
            }
        };

        self.state = PollState::Stopped;
        let summary = PollSummary {
            pages,
            messages,
            stop,
        };
        tracing::info!(?summary, history = self.history.len(), "polling stopped");
        Ok(summary)
    }

    /// `None` when cancelled mid-request.
    async fn fetch(&self, cancel: &CancellationToken) -> Option<Result<Page, SourceError>> {
        let req = PageRequest {
            stream_id: &self.stream_id,
            page_token: self.cursor.as_deref(),
            page_size_hint: self.cfg.page_size_hint,
        };
        tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            res = self.source.fetch_page(req) => Some(res),
        }
    }

    /// score → history → store, strictly in that order.
    async fn dispatch(&mut self, item: &RawItem) -> Observation {
        let msg = Message::from_raw(item);
        let score = handlers::score(&msg);
        handlers::append_to_history(&msg, &mut self.history);
        handlers::write_best_effort(&msg, self.store.as_ref(), self.cfg.store_timeout).await;

        counter!("chat_messages_total").increment(1);
        gauge!("chat_history_len").set(self.history.len() as f64);

        let obs = Observation::new(&msg, &score);
        tracing::debug!(target: "chat", "{obs}");
        obs
    }
}
