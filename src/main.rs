use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use rfplayer::platform::InMemoryPlatform;
use rfplayer::{PlayerConfig, PlayerController, PlayerEvent, PlayerHandle};

/// Drive a player against the in-memory platform.
///
/// Reads one JSON object per line from stdin: either a player event such as
/// `{"type":"click","control":"play_pause"}` or a clock tick `{"tick":1.5}`.
/// After each line the widget state is written to stdout as JSON.
#[derive(Parser)]
#[command(name = "rfplayer", version)]
struct Args {
    /// JSON file with player configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretend the loaded media has this duration in seconds
    #[arg(long)]
    duration: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Line {
    Tick { tick: f64 },
    Event(PlayerEvent),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            PlayerConfig::from_json(&text)?
        }
        None => PlayerConfig::default(),
    };

    let platform = InMemoryPlatform::new();
    let controller = PlayerController::new(&platform, config)?;
    if let Some(d) = args.duration {
        platform.media.load_metadata(d);
    }
    let (handle, task) = PlayerHandle::spawn(controller);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Line>(&line) {
            Ok(Line::Tick { tick }) => platform.media.advance(tick),
            Ok(Line::Event(event)) => {
                let outcome = handle.send(event).await?;
                if outcome.prevent_default {
                    log::debug!("default action prevented");
                }
            }
            Err(e) => {
                log::warn!("Skipping malformed line: {}", e);
                continue;
            }
        }
        let widgets = handle.widgets().await?;
        writeln!(out, "{}", serde_json::to_string(&widgets)?)?;
        out.flush()?;
    }

    handle.close().await?;
    task.await?;
    Ok(())
}
