//! Holo Daemon
//!
//! Headless surface for the Holo Conductor. Reads surface events as JSON
//! lines on stdin, drives the Conductor on a real clock, and writes every
//! Conductor message and host bridge call as JSON lines on stdout.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session
//! holo-daemon
//!
//! # Reproducible ambient glitches, no voice capture
//! holo-daemon --seed 7 --no-voice
//!
//! # Scripted run with verbose logging (logs go to stderr)
//! RUST_LOG=debug holo-daemon < events.jsonl
//! ```
//!
//! # Environment Variables
//!
//! - `HOLO_CONFIG`: Config file path (same as `--config`)
//! - `HOLO_*`: Configuration overrides, see `holo_conductor::config`
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

mod surface;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use holo_conductor::config::{default_config_path, load_config_with_env, ConfigOverrides};
use holo_conductor::{
    Conductor, ConductorConfig, ConductorMessage, ConductorState, RandomSource, RecordingBridge,
    StdRandom, SurfaceCapture,
};

use crate::surface::{parse_event, Outgoing, SurfaceWriter};

/// Headless stdio surface for the holo conductor
#[derive(Debug, Parser)]
#[command(name = "holo-daemon", version, about)]
struct Args {
    /// Configuration file (defaults to the XDG config location)
    #[arg(long, env = "HOLO_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for ambient randomness
    #[arg(long)]
    seed: Option<u64>,

    /// Report voice capture as unavailable
    #[arg(long)]
    no_voice: bool,

    /// Disable ambient glitch and pulse effects
    #[arg(long)]
    no_ambient: bool,

    /// Override the simulated transmission latency (milliseconds)
    #[arg(long)]
    transmission_latency_ms: Option<u64>,
}

type Writer = SurfaceWriter<tokio::io::Stdout>;

/// Layer the command line over file and environment configuration
fn resolve_config<F>(args: &Args, env: F) -> anyhow::Result<ConductorConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let config_path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_with_env(config_path.clone(), env)
        .with_context(|| format!("failed to load configuration from {config_path:?}"))?;

    let mut overrides = ConfigOverrides::new();
    if args.no_ambient {
        overrides = overrides.with_ambient_enabled(false);
    }
    if let Some(ms) = args.transmission_latency_ms {
        overrides = overrides.with_transmission_latency_ms(ms);
    }
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Forward everything the Conductor produced since the last flush
async fn flush(
    conductor: &mut Conductor<RecordingBridge>,
    rx: &mut mpsc::UnboundedReceiver<ConductorMessage>,
    out: &mut Writer,
) -> anyhow::Result<()> {
    for call in conductor.bridge_mut().take_calls() {
        out.write(&Outgoing::Bridge(call)).await?;
    }
    while let Ok(msg) = rx.try_recv() {
        out.write(&Outgoing::Message(msg)).await?;
    }
    Ok(())
}

/// Resolve once the next timer is due, or never if none is pending
async fn next_timer(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the protocol, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("holo_daemon=info".parse()?)
                .add_directive("holo_conductor=info".parse()?),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("Starting Holo Daemon");

    let config = resolve_config(&args, |key| std::env::var(key).ok())?;
    info!(source = %config.source(), "Configuration loaded");

    let random: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(StdRandom::seeded(seed)),
        None => Box::new(StdRandom::from_entropy()),
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut conductor = Conductor::new(
        RecordingBridge::new(),
        Box::new(SurfaceCapture::new(!args.no_voice)),
        random,
        config,
        tx,
    );
    let mut out = SurfaceWriter::new(tokio::io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    // Virtual time zero is the moment the Conductor starts
    let epoch = Instant::now();
    conductor.start();
    flush(&mut conductor, &mut rx, &mut out).await?;

    loop {
        let deadline = conductor.next_deadline().map(|due| epoch + due);

        tokio::select! {
            line = lines.next_line() => {
                conductor.advance_to(epoch.elapsed());
                match line.context("failed to read stdin")? {
                    Some(line) => match parse_event(&line) {
                        Ok(Some(event)) => conductor.handle_event(event),
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "Skipping input line"),
                    },
                    None => {
                        info!("stdin closed");
                        break;
                    }
                }
            }
            () = next_timer(deadline) => {
                conductor.advance_to(epoch.elapsed());
            }
            _ = signal::ctrl_c() => {
                info!("Received interrupt");
                break;
            }
        }

        flush(&mut conductor, &mut rx, &mut out).await?;
        if conductor.state() == ConductorState::ShuttingDown {
            break;
        }
    }

    conductor.shutdown();
    flush(&mut conductor, &mut rx, &mut out).await?;
    info!(records = out.written(), "Holo Daemon stopped");
    Ok(())
}
