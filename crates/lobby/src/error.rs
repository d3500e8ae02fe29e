use crate::device::{DeviceCapability, Slot};

/// Recoverable rejections produced by the slot registry.
///
/// None of these leave the registry in a partially updated state; the
/// offending input is simply dropped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("no free slot left for a new player")]
    NoFreeSlot,
    #[error("slot {0} is not registered")]
    SlotNotRegistered(Slot),
    #[error("unsupported input device capability: {0:?}")]
    UnsupportedCapability(DeviceCapability),
    #[error("slot {slot} is outside of 0..{max_slots}")]
    SlotOutOfRange { slot: Slot, max_slots: u8 },
    #[error("slot {0} is already occupied")]
    SlotOccupied(Slot),
}

/// Startup failures while loading or validating the lobby configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("max_slots must be within 1..=64, got {0}")]
    InvalidMaxSlots(u32),
    #[error("min_players_to_start must be within 1..={max_slots}, got {min}")]
    InvalidMinPlayers { min: u32, max_slots: u32 },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    #[error("initial player in slot {slot} rejected: {source}")]
    InitialPlayer { slot: Slot, source: LobbyError },
}
