//! Messages exchanged between the lobby and its collaborators.
//!
//! All inputs share one message type so a single reader sees them in the
//! order they were written, regardless of kind. The same holds for outputs.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::device::{DeviceCapability, DeviceId, Slot};

/// Input reported by the device layer or the lobby zones.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyInput {
    /// A device was plugged in. Never allocates a slot on its own.
    DeviceConnected {
        device: DeviceId,
        capability: DeviceCapability,
    },
    /// A device went away; any slot it controls is released.
    DeviceDisconnected { device: DeviceId },
    /// The join button was pressed on `device`.
    JoinIntent {
        device: DeviceId,
        capability: DeviceCapability,
    },
    /// The player owning `slot` entered (`true`) or left the ready zone.
    ReadyZone { slot: Slot, entered: bool },
    /// The player owning `slot` walked into a deregistering zone.
    DeregisterZone { slot: Slot },
}

/// Notification for the presentation layer.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LobbyNotification {
    /// A player object should be created for `slot`.
    SpawnRequested(Slot),
    /// The player object for `slot` should be destroyed.
    DespawnRequested(Slot),
    /// Result of the quorum check.
    AllReady(bool),
}
