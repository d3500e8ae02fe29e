//! Local multiplayer lobby for Forge of Stories.
//!
//! Players join by pressing the join button on an unassigned keyboard or
//! joystick. Each new participant gets the lowest free slot, walks into a
//! ready zone to signal readiness, and the lobby announces whether everyone
//! is ready once a minimum number of players is reached. Unplugging a
//! controller or walking into a deregistering zone frees the slot again.
//!
//! The state lives in [`SlotRegistry`], which can be used standalone with any
//! [`LobbySink`] or inside a Bevy app through [`LobbyPlugin`].
//!
//! # Example
//!
//! ```
//! use lobby::{DeviceCapability, DeviceId, LobbyConfig, LobbyNotification, Slot, SlotRegistry};
//!
//! let mut registry = SlotRegistry::new(&LobbyConfig::default()).unwrap();
//! let mut out: Vec<LobbyNotification> = Vec::new();
//!
//! let first = registry
//!     .allocate_slot(DeviceId(1), DeviceCapability::Joystick, &mut out)
//!     .unwrap();
//! let second = registry
//!     .allocate_slot(DeviceId(2), DeviceCapability::Keyboard, &mut out)
//!     .unwrap();
//! registry.set_ready(first, true, &mut out).unwrap();
//! registry.set_ready(second, true, &mut out).unwrap();
//!
//! assert_eq!(second, Slot::new(1));
//! assert_eq!(out.last(), Some(&LobbyNotification::AllReady(true)));
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod mask;
pub mod plugin;
pub mod registry;

pub use config::{InitialPlayer, LobbyConfig};
pub use device::{DeviceBinding, DeviceCapability, DeviceId, Slot, SlotBindings};
pub use error::{ConfigError, LobbyError};
pub use events::{LobbyInput, LobbyNotification};
pub use mask::SlotMask;
pub use plugin::{LobbyPlugin, LobbyStatus, LobbySystems};
pub use registry::{LobbySink, SlotRegistry};

/// Log target for lobby events.
pub const LOG_LOBBY: &str = "lobby";
