//! Slots, input devices and the bindings between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Small-integer identity assigned to one lobby participant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot(u8);

impl Slot {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn index(&self) -> u8 {
        self.0
    }
}

impl From<u8> for Slot {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identifier handed out by the input-device layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// What kind of controller a device is.
///
/// Only keyboards and joysticks can own a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceCapability {
    Keyboard,
    Joystick,
    Mouse,
    Custom,
}

impl DeviceCapability {
    pub const fn can_own_slot(&self) -> bool {
        matches!(self, Self::Keyboard | Self::Joystick)
    }
}

/// A device together with its capability tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceBinding {
    pub device: DeviceId,
    pub capability: DeviceCapability,
}

impl DeviceBinding {
    pub const fn new(device: DeviceId, capability: DeviceCapability) -> Self {
        Self { device, capability }
    }
}

/// Devices controlling one occupied slot.
///
/// A slot holds at most one keyboard; joysticks accumulate, although a
/// typical session binds exactly one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SlotBindings {
    keyboard: Option<DeviceId>,
    joysticks: Vec<DeviceId>,
}

impl SlotBindings {
    pub fn has_keyboard(&self) -> bool {
        self.keyboard.is_some()
    }

    pub fn keyboard(&self) -> Option<DeviceId> {
        self.keyboard
    }

    pub fn joysticks(&self) -> &[DeviceId] {
        &self.joysticks
    }

    pub fn is_empty(&self) -> bool {
        self.keyboard.is_none() && self.joysticks.is_empty()
    }

    pub fn contains(&self, device: DeviceId) -> bool {
        self.keyboard == Some(device) || self.joysticks.contains(&device)
    }

    /// Binds `binding` to the slot.
    ///
    /// Joysticks previously held by the slot are dropped first. A keyboard
    /// replaces any earlier keyboard, a joystick is appended. Devices pushed
    /// out of the slot are returned so the caller can hand them back to the
    /// unassigned pool.
    ///
    /// The registry only binds into empty slots today, so nothing is
    /// displaced there. The displacement rules still have to hold if an
    /// occupied slot is ever rebound.
    pub(crate) fn bind(&mut self, binding: DeviceBinding) -> Vec<DeviceBinding> {
        let mut displaced: Vec<DeviceBinding> = self
            .joysticks
            .drain(..)
            .map(|device| DeviceBinding::new(device, DeviceCapability::Joystick))
            .collect();

        match binding.capability {
            DeviceCapability::Keyboard => {
                if let Some(previous) = self.keyboard.replace(binding.device) {
                    if previous != binding.device {
                        displaced.push(DeviceBinding::new(previous, DeviceCapability::Keyboard));
                    }
                }
            }
            DeviceCapability::Joystick => self.joysticks.push(binding.device),
            DeviceCapability::Mouse | DeviceCapability::Custom => {}
        }
        displaced.retain(|d| d.device != binding.device);
        displaced
    }

    /// Removes `device` from the slot. Returns `true` if it was bound.
    pub(crate) fn unbind(&mut self, device: DeviceId) -> bool {
        if self.keyboard == Some(device) {
            self.keyboard = None;
            return true;
        }
        let before = self.joysticks.len();
        self.joysticks.retain(|&d| d != device);
        self.joysticks.len() != before
    }

    /// Empties the slot, returning every device it held.
    pub(crate) fn take_all(&mut self) -> Vec<DeviceBinding> {
        let mut devices: Vec<DeviceBinding> = self
            .keyboard
            .take()
            .map(|device| DeviceBinding::new(device, DeviceCapability::Keyboard))
            .into_iter()
            .collect();
        devices.extend(
            self.joysticks
                .drain(..)
                .map(|device| DeviceBinding::new(device, DeviceCapability::Joystick)),
        );
        devices
    }
}
