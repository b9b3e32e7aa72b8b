//! Demo player: builds a timeline for a piece of reply text and plays it
//! to stdout in real time, so the pacing can be eyeballed.
//!
//! Usage: `chatterline [--seed N] [--config FILE] [--debug|-v] TEXT...`

mod behavior;
mod config;
mod coordinator;
mod errors;
mod providers;
mod session;
mod transport;
mod types;

use std::env;
use std::path::Path;
use std::process;

use async_trait::async_trait;
use tokio::sync::watch;

use behavior::{build_timeline, EmotionMap};
use config::CharacterBehaviorConfig;
use coordinator::{ActionSink, Coordinator};
use errors::Result;
use transport::to_outbound;
use types::TimedAction;

/// Prints each wire event as one JSON line.
struct StdoutSink;

#[async_trait]
impl ActionSink for StdoutSink {
    async fn emit(&mut self, action: &TimedAction) -> Result<()> {
        if let Some(event) = to_outbound(action, "demo") {
            let line = serde_json::to_string(&event)
                .map_err(|e| errors::EngineError::SerializationError(e.to_string()))?;
            println!("{line}");
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let verbose = args.iter().any(|arg| arg == "--verbose" || arg == "-v");
    let debug = args.iter().any(|arg| arg == "--debug");

    let log_level = if debug {
        tracing::Level::DEBUG
    } else if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut seed: Option<u64> = None;
    let mut config_path: Option<String> = None;
    let mut text_parts: Vec<String> = Vec::new();

    let mut iter = args.iter().peekable();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--seed" => {
                let value = iter.next().map(|s| s.parse::<u64>());
                match value {
                    Some(Ok(v)) => seed = Some(v),
                    _ => {
                        eprintln!("--seed requires an integer value");
                        process::exit(2);
                    }
                }
            }
            "--config" => match iter.next() {
                Some(path) => config_path = Some(path.clone()),
                None => {
                    eprintln!("--config requires a file path");
                    process::exit(2);
                }
            },
            "--verbose" | "-v" | "--debug" => {}
            other => text_parts.push(other.to_string()),
        }
    }

    let text = if text_parts.is_empty() {
        "你好，我在忙。稍等一下哦".to_string()
    } else {
        text_parts.join(" ")
    };

    let config = match config_path {
        Some(path) => CharacterBehaviorConfig::load_file(Path::new(&path))?,
        None => CharacterBehaviorConfig::default(),
    };

    let timeline = build_timeline(&text, &config, &EmotionMap::neutral(), seed)?;
    tracing::info!(
        actions = timeline.len(),
        sends = timeline.send_count(),
        duration_ms = timeline.total_duration_ms(),
        "playing timeline"
    );

    let (_interrupt_tx, interrupt_rx) = watch::channel(false);
    let mut coordinator = Coordinator::new(config.interrupt_policy);
    let outcome = coordinator
        .run(timeline, &mut StdoutSink, interrupt_rx)
        .await?;
    tracing::info!(?outcome, "done");

    Ok(())
}
