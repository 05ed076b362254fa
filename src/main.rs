//! Live chat analyzer: binary entrypoint.
//! `chat` polls a live chat and prints one observation per message;
//! `ask` answers a question from a transcript via lexical retrieval.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use live_chat_analyzer::config::{AppConfig, LogFormat};
use live_chat_analyzer::ingest::providers::{FixtureChatSource, YouTubeChatSource};
use live_chat_analyzer::ingest::types::ChatSource;
use live_chat_analyzer::metrics::Metrics;
use live_chat_analyzer::retrieval::StubGenerator;
use live_chat_analyzer::transcript::load_transcript;
use live_chat_analyzer::{build_retriever, build_store, PollingEngine};

#[derive(Debug, Parser)]
#[command(name = "live-chat-analyzer", version, about)]
struct Cli {
    /// Config file (TOML or JSON). Defaults to $LIVE_CHAT_CONFIG_PATH, then config/live_chat.*.
    #[arg(long, short = 'c', value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Poll a live chat until Ctrl-C, the iteration bound, or the stream ends.
    Chat(ChatArgs),
    /// Answer a question from a local transcript file.
    ///
    /// The transcript is not fetched by video id; export it first as plain
    /// text or as a JSON array of `{"text": ...}` segments.
    Ask(AskArgs),
}

#[derive(Debug, Args)]
struct ChatArgs {
    /// Video whose active live chat should be polled.
    #[arg(long, conflicts_with_all = ["live_chat_id", "fixture"])]
    video_id: Option<String>,
    /// Live chat id, skipping the video lookup.
    #[arg(long, conflicts_with = "fixture")]
    live_chat_id: Option<String>,
    /// Replay pages from a JSON fixture instead of calling the API.
    #[arg(long, value_name = "FILE")]
    fixture: Option<PathBuf>,
    /// Overrides `polling.max_iterations` (0 = unbounded).
    #[arg(long)]
    max_iterations: Option<u64>,
}

#[derive(Debug, Args)]
struct AskArgs {
    /// Local transcript (`.json` segments or plain text), not a video id.
    #[arg(long, value_name = "FILE")]
    transcript: PathBuf,
    #[arg(long)]
    question: String,
    /// Overrides `retrieval.top_k`.
    #[arg(long)]
    k: Option<usize>,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("live_chat_analyzer=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Compact => registry.with(fmt::layer().compact()).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(p) => AppConfig::load_from_file(p)?,
        None => AppConfig::load_default()?,
    };
    init_tracing(cfg.telemetry.log_format);

    match cli.command {
        Command::Chat(args) => run_chat(cfg, args).await,
        Command::Ask(args) => run_ask(cfg, args).await,
    }
}

async fn run_chat(mut cfg: AppConfig, args: ChatArgs) -> Result<()> {
    if let Some(n) = args.max_iterations {
        cfg.polling.max_iterations = n;
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("stopped by user");
                cancel.cancel();
            }
        });
    }

    if let Some(addr) = cfg.telemetry.metrics_addr.clone() {
        let metrics = Metrics::init()?;
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = metrics.serve(&addr, cancel).await {
                tracing::warn!(error = ?e, "metrics endpoint stopped");
            }
        });
    }

    let (source, stream_id): (Box<dyn ChatSource>, String) = match args.fixture {
        Some(path) => {
            let fixture: Box<dyn ChatSource> = Box::new(FixtureChatSource::from_path(&path)?);
            (fixture, "fixture".to_string())
        }
        None => {
            let yt = YouTubeChatSource::new(
                &cfg.source.api_base,
                cfg.source.resolved_api_key(),
                cfg.source.resolved_access_token(),
                Duration::from_millis(cfg.source.request_timeout_ms),
            )?;
            let chat_id = match (args.live_chat_id, args.video_id) {
                (Some(id), _) => id,
                (None, Some(video)) => yt
                    .resolve_live_chat_id(&video)
                    .await
                    .context("could not find an active live chat for this video")?,
                (None, None) => anyhow::bail!("pass --video-id, --live-chat-id or --fixture"),
            };
            let yt: Box<dyn ChatSource> = Box::new(yt);
            (yt, chat_id)
        }
    };

    let mut engine =
        PollingEngine::new(source, stream_id, cfg.poller_cfg()).with_store(build_store(&cfg));

    println!("Starting live chat poll (Ctrl-C to stop)...");
    let summary = engine
        .run(&cancel, |obs| println!("{obs}"))
        .await
        .context("live chat polling failed")?;
    cancel.cancel();

    tracing::info!(
        pages = summary.pages,
        messages = summary.messages,
        stop = ?summary.stop,
        history = engine.history().len(),
        "session finished"
    );
    Ok(())
}

async fn run_ask(cfg: AppConfig, args: AskArgs) -> Result<()> {
    let transcript = load_transcript(&args.transcript)?;
    println!("\nTranscript loaded successfully!");

    let retriever = build_retriever(&cfg);
    let k = args.k.unwrap_or(cfg.retrieval.top_k);
    let answer = retriever
        .answer(&StubGenerator, &transcript, &args.question, k)
        .await?;

    println!("\nAnswer from AI:");
    println!("{answer}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn ask_help_says_transcript_is_local() {
        let cmd = Cli::command();
        let ask = cmd.find_subcommand("ask").expect("ask subcommand");
        let about = ask.get_long_about().expect("long about").to_string();
        assert!(about.contains("not fetched by video id"), "got: {about}");
    }

    #[test]
    fn ask_parses_transcript_path() {
        let cli = Cli::parse_from([
            "live-chat-analyzer",
            "ask",
            "--transcript",
            "t.txt",
            "--question",
            "q",
        ]);
        match cli.command {
            Command::Ask(a) => assert_eq!(a.transcript, PathBuf::from("t.txt")),
            Command::Chat(_) => panic!("expected ask"),
        }
    }
}
