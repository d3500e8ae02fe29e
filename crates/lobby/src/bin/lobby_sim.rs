//! Headless lobby driver.
//!
//! Replays a RON list of [`LobbyInput`]s through the [`LobbyPlugin`] and logs
//! every notification the lobby emits.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use bevy::prelude::*;
use clap::Parser;
use lobby::{LOG_LOBBY, LobbyConfig, LobbyInput, LobbyNotification, LobbyPlugin, LobbyStatus, SlotRegistry};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(version, about = "Replays a scripted lobby session")]
struct Cli {
    /// RON file containing a list of lobby inputs.
    script: PathBuf,

    /// Lobby configuration (RON). Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run one frame per input instead of one frame for the whole script.
    #[arg(long)]
    frame_per_input: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::Layer::default().with_target(true))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => LobbyConfig::load(path)?,
        None => LobbyConfig::default(),
    };
    let text = std::fs::read_to_string(&cli.script)
        .with_context(|| format!("reading script {}", cli.script.display()))?;
    let inputs: Vec<LobbyInput> = ron::from_str(&text).context("parsing lobby script")?;

    let mut app = App::new();
    app.add_plugins(LobbyPlugin::new(config));
    if let LobbyStatus::Misconfigured(reason) = app.world().resource::<LobbyStatus>() {
        bail!("lobby is misconfigured: {reason}");
    }

    let frames: Vec<Vec<LobbyInput>> = if cli.frame_per_input {
        inputs.into_iter().map(|input| vec![input]).collect()
    } else {
        vec![inputs]
    };

    for (frame, batch) in frames.into_iter().enumerate() {
        for input in batch {
            app.world_mut().write_message(input);
        }
        app.update();

        let notifications: Vec<LobbyNotification> = app
            .world_mut()
            .resource_mut::<Messages<LobbyNotification>>()
            .drain()
            .collect();
        for notification in notifications {
            info!(target: LOG_LOBBY, "frame {}: {:?}", frame, notification);
        }
    }

    let registry = app.world().resource::<SlotRegistry>();
    info!(
        target: LOG_LOBBY,
        "Session ended: registered {}, ready {}, all ready: {}",
        registry.registered_mask(),
        registry.ready_mask(),
        registry.is_quorum()
    );
    Ok(())
}
