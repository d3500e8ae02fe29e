//! Lobby configuration.
//!
//! Read once at startup from a RON file and immutable afterwards.

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::device::{DeviceCapability, DeviceId, Slot};
use crate::error::ConfigError;
use crate::mask::MASK_BITS;

#[derive(Resource, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LobbyConfig {
    /// Players needed before the quorum can hold.
    pub min_players_to_start: u32,
    /// Width of the slot masks.
    pub max_slots: u32,
    /// Re-evaluate and announce the quorum after a slot is released.
    pub announce_on_release: bool,
    /// The always-present keyboard. Starts in the unassigned pool unless an
    /// initial player already holds it.
    pub keyboard: Option<DeviceId>,
    /// Players still in the session when the lobby opens. Their slots are
    /// occupied without a spawn request.
    pub initial_players: Vec<InitialPlayer>,
}

/// A player carried over into the lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialPlayer {
    pub slot: Slot,
    pub device: DeviceId,
    pub capability: DeviceCapability,
}

impl InitialPlayer {
    pub const fn new(slot: Slot, device: DeviceId, capability: DeviceCapability) -> Self {
        Self {
            slot,
            device,
            capability,
        }
    }
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            min_players_to_start: 2,
            max_slots: 4,
            announce_on_release: false,
            keyboard: None,
            initial_players: Vec::new(),
        }
    }
}

impl LobbyConfig {
    /// Parses a RON document and validates it.
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(text).map_err(|e| ConfigError::Deserialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a configuration file (RON format).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron(&text)?;
        info!("Lobby config loaded from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_slots == 0 || self.max_slots > u32::from(MASK_BITS) {
            return Err(ConfigError::InvalidMaxSlots(self.max_slots));
        }
        if self.min_players_to_start == 0 || self.min_players_to_start > self.max_slots {
            return Err(ConfigError::InvalidMinPlayers {
                min: self.min_players_to_start,
                max_slots: self.max_slots,
            });
        }
        Ok(())
    }
}
