//! Bevy integration for the slot registry.
//!
//! The device layer writes [`LobbyInput`] messages, the presentation layer
//! reads [`LobbyNotification`] messages. Inputs are handled by a single
//! system in the order they were written.

use bevy::prelude::*;
use tracing::{error, info, warn};

use crate::LOG_LOBBY;
use crate::config::LobbyConfig;
use crate::events::{LobbyInput, LobbyNotification};
use crate::registry::SlotRegistry;

/// Plugin installing the [`SlotRegistry`] and its message plumbing.
///
/// # Example
/// ```no_run
/// use bevy::prelude::*;
/// use lobby::{LobbyConfig, LobbyPlugin};
///
/// App::new()
///     .add_plugins(LobbyPlugin::new(LobbyConfig::default()))
///     .run();
/// ```
#[derive(Default)]
pub struct LobbyPlugin {
    pub config: LobbyConfig,
}

impl LobbyPlugin {
    pub fn new(config: LobbyConfig) -> Self {
        Self { config }
    }
}

impl Plugin for LobbyPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<LobbyInput>()
            .add_message::<LobbyNotification>()
            .insert_resource(self.config.clone())
            .add_systems(
                Update,
                (
                    process_lobby_inputs.run_if(resource_exists::<SlotRegistry>),
                    reject_lobby_inputs.run_if(not(resource_exists::<SlotRegistry>)),
                )
                    .in_set(LobbySystems::ProcessInput),
            );

        match SlotRegistry::new(&self.config) {
            Ok(registry) => {
                info!(
                    target: LOG_LOBBY,
                    "Lobby open with {} slots, {} players needed, {} carried over",
                    registry.max_slots(),
                    self.config.min_players_to_start,
                    registry.player_count()
                );
                app.insert_resource(registry)
                    .insert_resource(LobbyStatus::Accepting);
            }
            Err(e) => {
                error!(target: LOG_LOBBY, "Lobby configuration rejected: {}", e);
                app.insert_resource(LobbyStatus::Misconfigured(e.to_string()));
            }
        }
    }
}

/// System sets for the lobby.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum LobbySystems {
    /// Applies pending [`LobbyInput`]s to the registry.
    ProcessInput,
}

/// Whether the lobby accepts inputs.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub enum LobbyStatus {
    Accepting,
    /// Startup failed; inputs are dropped until the app is rebuilt with a
    /// valid configuration.
    Misconfigured(String),
}

/// Feeds every pending input through the registry.
pub fn process_lobby_inputs(
    mut inputs: MessageReader<LobbyInput>,
    mut registry: ResMut<SlotRegistry>,
    mut notifications: MessageWriter<LobbyNotification>,
) {
    for input in inputs.read() {
        registry.handle_input(*input, &mut notifications);
    }
}

fn reject_lobby_inputs(mut inputs: MessageReader<LobbyInput>, status: Res<LobbyStatus>) {
    let dropped = inputs.read().count();
    if dropped > 0 {
        warn!(
            target: LOG_LOBBY,
            "Dropped {} lobby inputs, lobby is not accepting: {:?}", dropped, *status
        );
    }
}
