//! Slot allocation and readiness state machine.
//!
//! The [`SlotRegistry`] is the only owner of the registered and ready masks.
//! Every slot is in one of three states: free, occupied and not ready,
//! occupied and ready. Allocation moves a slot from free to occupied, the
//! ready zone toggles between the two occupied states, and deregistration or
//! a device disconnect frees it again.

use bevy::prelude::*;
use tracing::{debug, info, warn};

use crate::LOG_LOBBY;
use crate::config::LobbyConfig;
use crate::device::{DeviceBinding, DeviceCapability, DeviceId, Slot, SlotBindings};
use crate::error::{ConfigError, LobbyError};
use crate::events::{LobbyInput, LobbyNotification};
use crate::mask::SlotMask;

/// Receiver for lobby notifications.
pub trait LobbySink {
    fn notify(&mut self, notification: LobbyNotification);
}

impl LobbySink for Vec<LobbyNotification> {
    fn notify(&mut self, notification: LobbyNotification) {
        self.push(notification);
    }
}

impl LobbySink for MessageWriter<'_, LobbyNotification> {
    fn notify(&mut self, notification: LobbyNotification) {
        self.write(notification);
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SlotRegistry {
    max_slots: u8,
    /// Low `min_players_to_start - 1` bits. Compared by magnitude.
    min_quorum: SlotMask,
    announce_on_release: bool,
    registered: SlotMask,
    ready: SlotMask,
    /// Indexed by slot, always `max_slots` long.
    bindings: Vec<SlotBindings>,
    /// Connected devices not bound to any slot.
    unassigned: Vec<DeviceBinding>,
}

impl SlotRegistry {
    pub fn new(config: &LobbyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let max_slots = config.max_slots as u8;
        let min_quorum = SlotMask::low_bits((config.min_players_to_start - 1) as u8);

        let mut registry = Self {
            max_slots,
            min_quorum,
            announce_on_release: config.announce_on_release,
            registered: SlotMask::EMPTY,
            ready: SlotMask::EMPTY,
            bindings: vec![SlotBindings::default(); usize::from(max_slots)],
            unassigned: Vec::new(),
        };

        for player in &config.initial_players {
            registry
                .adopt_slot(player.slot, player.device, player.capability)
                .map_err(|source| ConfigError::InitialPlayer {
                    slot: player.slot,
                    source,
                })?;
        }
        if let Some(keyboard) = config.keyboard {
            registry.return_to_pool(DeviceBinding::new(keyboard, DeviceCapability::Keyboard));
        }
        Ok(registry)
    }

    // ==========================================================================
    // Queries
    // ==========================================================================

    pub fn max_slots(&self) -> u8 {
        self.max_slots
    }

    pub fn registered_mask(&self) -> SlotMask {
        self.registered
    }

    pub fn ready_mask(&self) -> SlotMask {
        self.ready
    }

    pub fn min_quorum_mask(&self) -> SlotMask {
        self.min_quorum
    }

    pub fn is_occupied(&self, slot: Slot) -> bool {
        self.registered.contains(slot)
    }

    pub fn is_ready(&self, slot: Slot) -> bool {
        self.ready.contains(slot)
    }

    pub fn player_count(&self) -> u32 {
        self.registered.len()
    }

    pub fn occupied_slots(&self) -> impl Iterator<Item = Slot> {
        self.registered.iter()
    }

    /// Devices bound to `slot`, or `None` if the slot is free.
    pub fn bindings(&self, slot: Slot) -> Option<&SlotBindings> {
        if !self.is_occupied(slot) {
            return None;
        }
        self.bindings.get(usize::from(slot.index()))
    }

    /// Slots controlled by `device`.
    pub fn slots_of(&self, device: DeviceId) -> Vec<Slot> {
        self.registered
            .iter()
            .filter(|slot| self.bindings[usize::from(slot.index())].contains(device))
            .collect()
    }

    pub fn unassigned_devices(&self) -> &[DeviceBinding] {
        &self.unassigned
    }

    /// All occupied slots are ready and the registered mask, read as an
    /// unsigned integer, is greater than the minimum quorum mask.
    ///
    /// The second half is a magnitude test on the bit pattern and therefore
    /// depends on *which* slots are occupied, not only on how many.
    pub fn is_quorum(&self) -> bool {
        self.ready == self.registered && self.registered > self.min_quorum
    }

    // ==========================================================================
    // Operations
    // ==========================================================================

    /// Gives the lowest free slot to `device` and requests a spawn for it.
    ///
    /// Identical devices are not deduplicated: pressing join again on an
    /// already bound device allocates another slot.
    pub fn allocate_slot(
        &mut self,
        device: DeviceId,
        capability: DeviceCapability,
        sink: &mut impl LobbySink,
    ) -> Result<Slot, LobbyError> {
        if !capability.can_own_slot() {
            return Err(LobbyError::UnsupportedCapability(capability));
        }
        let slot = self
            .registered
            .first_free(self.max_slots)
            .ok_or(LobbyError::NoFreeSlot)?;

        self.registered.insert(slot);
        self.bind(slot, DeviceBinding::new(device, capability));

        match capability {
            DeviceCapability::Keyboard => {
                info!(target: LOG_LOBBY, "Assigned keyboard {} to player {}", device, slot);
            }
            DeviceCapability::Joystick => {
                info!(target: LOG_LOBBY, "Assigned joystick {} to player {}", device, slot);
            }
            DeviceCapability::Mouse | DeviceCapability::Custom => {}
        }

        sink.notify(LobbyNotification::SpawnRequested(slot));
        Ok(slot)
    }

    /// Marks `slot` as occupied by an already existing player.
    ///
    /// Used when the lobby is entered while players are still in the
    /// session. No spawn is requested.
    pub fn adopt_slot(
        &mut self,
        slot: Slot,
        device: DeviceId,
        capability: DeviceCapability,
    ) -> Result<(), LobbyError> {
        if slot.index() >= self.max_slots {
            return Err(LobbyError::SlotOutOfRange {
                slot,
                max_slots: self.max_slots,
            });
        }
        if !capability.can_own_slot() {
            return Err(LobbyError::UnsupportedCapability(capability));
        }
        if self.registered.contains(slot) {
            return Err(LobbyError::SlotOccupied(slot));
        }

        self.registered.insert(slot);
        self.bind(slot, DeviceBinding::new(device, capability));
        info!(target: LOG_LOBBY, "Adopted player {} with {}", slot, device);
        Ok(())
    }

    /// Frees `slot`, clearing its ready bit and handing its devices back to
    /// the unassigned pool.
    ///
    /// Returns `false` without side effects if the slot was already free.
    /// The quorum is only re-announced when `announce_on_release` is set.
    pub fn release_slot(&mut self, slot: Slot, sink: &mut impl LobbySink) -> bool {
        if !self.registered.contains(slot) {
            return false;
        }

        self.registered.remove(slot);
        self.ready.remove(slot);
        let devices = self.bindings[usize::from(slot.index())].take_all();
        for binding in devices {
            self.return_to_pool(binding);
        }
        info!(target: LOG_LOBBY, "Unregistering player {}", slot);

        if self.announce_on_release {
            self.announce(sink);
        }
        true
    }

    /// Releases `slot` and requests its player object to be destroyed.
    pub fn deregister(&mut self, slot: Slot, sink: &mut impl LobbySink) -> bool {
        if !self.release_slot(slot, sink) {
            debug!(target: LOG_LOBBY, "Player {} is not registered, nothing to deregister", slot);
            return false;
        }
        sink.notify(LobbyNotification::DespawnRequested(slot));
        true
    }

    /// Updates the ready bit of `slot` and announces the quorum.
    ///
    /// `AllReady` is emitted on every successful call, even if neither the
    /// ready bit nor the quorum changed. Returns the announced value.
    pub fn set_ready(
        &mut self,
        slot: Slot,
        ready: bool,
        sink: &mut impl LobbySink,
    ) -> Result<bool, LobbyError> {
        if !self.registered.contains(slot) {
            return Err(LobbyError::SlotNotRegistered(slot));
        }

        self.ready.set(slot, ready);
        info!(target: LOG_LOBBY, "Setting player {} ready status to {}", slot, ready);
        Ok(self.announce(sink))
    }

    /// Releases every slot controlled by `device` and requests a despawn
    /// for each. Returns the released slots.
    pub fn handle_device_disconnect(
        &mut self,
        device: DeviceId,
        sink: &mut impl LobbySink,
    ) -> Vec<Slot> {
        self.unassigned.retain(|binding| binding.device != device);

        let owned = self.slots_of(device);
        for &slot in &owned {
            let bindings = &mut self.bindings[usize::from(slot.index())];
            if bindings.keyboard() == Some(device) {
                debug!(target: LOG_LOBBY, "Releasing keyboard of player {}", slot);
            } else {
                debug!(target: LOG_LOBBY, "Removing {} from player {}", device, slot);
            }
            bindings.unbind(device);

            self.release_slot(slot, sink);
            sink.notify(LobbyNotification::DespawnRequested(slot));
        }

        if owned.is_empty() {
            debug!(target: LOG_LOBBY, "{} disconnected without a player", device);
        }
        owned
    }

    /// Tracks a newly connected device in the unassigned pool.
    pub fn device_connected(&mut self, device: DeviceId, capability: DeviceCapability) {
        match capability {
            DeviceCapability::Keyboard | DeviceCapability::Joystick => {
                if self.slots_of(device).is_empty() {
                    self.return_to_pool(DeviceBinding::new(device, capability));
                }
            }
            DeviceCapability::Mouse | DeviceCapability::Custom => {
                debug!(target: LOG_LOBBY, "Ignoring {:?} device {}", capability, device);
            }
        }
    }

    /// Dispatches one input to the matching operation.
    ///
    /// Rejected inputs are logged and dropped.
    pub fn handle_input(&mut self, input: LobbyInput, sink: &mut impl LobbySink) {
        match input {
            LobbyInput::DeviceConnected { device, capability } => {
                self.device_connected(device, capability);
            }
            LobbyInput::DeviceDisconnected { device } => {
                self.handle_device_disconnect(device, sink);
            }
            LobbyInput::JoinIntent { device, capability } => {
                if let Err(e) = self.allocate_slot(device, capability, sink) {
                    warn!(target: LOG_LOBBY, "Ignoring join from {}: {}", device, e);
                }
            }
            LobbyInput::ReadyZone { slot, entered } => {
                if let Err(e) = self.set_ready(slot, entered, sink) {
                    warn!(target: LOG_LOBBY, "Ignoring ready toggle: {}", e);
                }
            }
            LobbyInput::DeregisterZone { slot } => {
                self.deregister(slot, sink);
            }
        }
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    fn announce(&self, sink: &mut impl LobbySink) -> bool {
        let all_ready = self.is_quorum();
        sink.notify(LobbyNotification::AllReady(all_ready));
        all_ready
    }

    fn bind(&mut self, slot: Slot, binding: DeviceBinding) {
        self.unassigned.retain(|b| b.device != binding.device);
        let displaced = self.bindings[usize::from(slot.index())].bind(binding);
        for binding in displaced {
            self.return_to_pool(binding);
        }
    }

    /// Adds `binding` to the pool unless it is already there or another slot
    /// still holds the device.
    fn return_to_pool(&mut self, binding: DeviceBinding) {
        if self.unassigned.iter().any(|b| b.device == binding.device) {
            return;
        }
        if !self.slots_of(binding.device).is_empty() {
            debug!(target: LOG_LOBBY, "{} is still bound, not pooled", binding.device);
            return;
        }
        debug!(target: LOG_LOBBY, "{} is unassigned", binding.device);
        self.unassigned.push(binding);
    }
}
