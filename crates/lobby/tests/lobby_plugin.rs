use bevy::prelude::*;
use lobby::{
    DeviceBinding, DeviceCapability, DeviceId, InitialPlayer, LobbyConfig, LobbyInput, LobbyNotification, LobbyPlugin,
    LobbyStatus, Slot, SlotRegistry,
};
use test_log::test;

use lobby::LobbyNotification::{AllReady, DespawnRequested, SpawnRequested};

const KEYBOARD: DeviceId = DeviceId(0);

fn pad(n: u32) -> DeviceId {
    DeviceId(100 + n)
}

fn join_pad(n: u32) -> LobbyInput {
    LobbyInput::JoinIntent {
        device: pad(n),
        capability: DeviceCapability::Joystick,
    }
}

fn ready(slot: u8, entered: bool) -> LobbyInput {
    LobbyInput::ReadyZone {
        slot: Slot::new(slot),
        entered,
    }
}

fn lobby_app(config: LobbyConfig) -> App {
    let mut app = App::new();
    app.add_plugins(LobbyPlugin::new(config));
    app
}

/// Writes `inputs`, runs one frame and returns everything the lobby emitted.
fn run_frame(
    app: &mut App,
    inputs: impl IntoIterator<Item = LobbyInput>,
) -> Vec<LobbyNotification> {
    for input in inputs {
        app.world_mut().write_message(input);
    }
    app.update();
    app.world_mut()
        .resource_mut::<Messages<LobbyNotification>>()
        .drain()
        .collect()
}

#[test]
fn join_and_ready_up() {
    let mut app = lobby_app(LobbyConfig::default());
    assert_eq!(
        *app.world().resource::<LobbyStatus>(),
        LobbyStatus::Accepting
    );

    let out = run_frame(
        &mut app,
        [
            join_pad(0),
            LobbyInput::JoinIntent {
                device: KEYBOARD,
                capability: DeviceCapability::Keyboard,
            },
        ],
    );
    assert_eq!(
        out,
        vec![SpawnRequested(Slot::new(0)), SpawnRequested(Slot::new(1))]
    );

    let out = run_frame(&mut app, [ready(0, true)]);
    assert_eq!(out, vec![AllReady(false)]);

    let out = run_frame(&mut app, [ready(1, true)]);
    assert_eq!(out, vec![AllReady(true)]);

    let out = run_frame(&mut app, [ready(1, false)]);
    assert_eq!(out, vec![AllReady(false)]);

    let registry = app.world().resource::<SlotRegistry>();
    assert_eq!(registry.registered_mask().bits(), 0b11);
    assert_eq!(registry.ready_mask().bits(), 0b01);
}

#[test]
fn lone_player_is_never_all_ready() {
    let mut app = lobby_app(LobbyConfig::default());
    run_frame(&mut app, [join_pad(0)]);

    let out = run_frame(&mut app, [ready(0, true), ready(0, true)]);
    assert_eq!(out, vec![AllReady(false), AllReady(false)]);
}

#[test]
fn disconnect_frees_slot_and_lowest_index_is_reused() {
    let mut app = lobby_app(LobbyConfig::default());
    run_frame(
        &mut app,
        [
            join_pad(0),
            join_pad(1),
            join_pad(2),
            join_pad(3),
            LobbyInput::DeregisterZone { slot: Slot::new(1) },
        ],
    );
    assert_eq!(
        app.world().resource::<SlotRegistry>().registered_mask().bits(),
        0b1101
    );

    let out = run_frame(&mut app, [LobbyInput::DeviceDisconnected { device: pad(2) }]);
    assert_eq!(out, vec![DespawnRequested(Slot::new(2))]);
    assert_eq!(
        app.world().resource::<SlotRegistry>().registered_mask().bits(),
        0b1001
    );

    let out = run_frame(&mut app, [join_pad(7)]);
    assert_eq!(out, vec![SpawnRequested(Slot::new(1))]);
}

#[test]
fn inputs_are_applied_in_arrival_order() {
    let mut app = lobby_app(LobbyConfig::default());

    let out = run_frame(
        &mut app,
        [
            join_pad(0),
            ready(0, true),
            LobbyInput::DeregisterZone { slot: Slot::new(0) },
            // slot 0 is free again, so this ready toggle is dropped
            ready(0, true),
            join_pad(1),
        ],
    );
    assert_eq!(
        out,
        vec![
            SpawnRequested(Slot::new(0)),
            AllReady(false),
            DespawnRequested(Slot::new(0)),
            SpawnRequested(Slot::new(0)),
        ]
    );
    assert!(app.world().resource::<SlotRegistry>().ready_mask().is_empty());
}

#[test]
fn rejected_inputs_emit_nothing() {
    let mut app = lobby_app(LobbyConfig {
        max_slots: 1,
        min_players_to_start: 1,
        ..Default::default()
    });

    let out = run_frame(
        &mut app,
        [
            LobbyInput::JoinIntent {
                device: DeviceId(9),
                capability: DeviceCapability::Mouse,
            },
            ready(0, true),
            LobbyInput::DeregisterZone { slot: Slot::new(0) },
            LobbyInput::DeviceConnected {
                device: pad(0),
                capability: DeviceCapability::Joystick,
            },
        ],
    );
    assert!(out.is_empty());

    let out = run_frame(&mut app, [join_pad(0), join_pad(1)]);
    assert_eq!(out, vec![SpawnRequested(Slot::new(0))]);
}

#[test]
fn release_announces_when_configured() {
    let mut app = lobby_app(LobbyConfig {
        announce_on_release: true,
        ..Default::default()
    });
    run_frame(&mut app, [join_pad(0), join_pad(1), join_pad(2)]);
    run_frame(&mut app, [ready(0, true), ready(1, true)]);

    let out = run_frame(&mut app, [LobbyInput::DeviceDisconnected { device: pad(2) }]);
    assert_eq!(out, vec![AllReady(true), DespawnRequested(Slot::new(2))]);
}

#[test]
fn misconfigured_lobby_drops_inputs() {
    let mut app = lobby_app(LobbyConfig {
        max_slots: 0,
        ..Default::default()
    });
    assert!(matches!(
        app.world().resource::<LobbyStatus>(),
        LobbyStatus::Misconfigured(_)
    ));
    assert!(!app.world().contains_resource::<SlotRegistry>());

    let out = run_frame(&mut app, [join_pad(0)]);
    assert!(out.is_empty());
}

#[test]
fn carried_over_players_occupy_slots_without_spawning() {
    let mut app = lobby_app(LobbyConfig {
        keyboard: Some(KEYBOARD),
        initial_players: vec![InitialPlayer::new(
            Slot::new(0),
            pad(0),
            DeviceCapability::Joystick,
        )],
        ..Default::default()
    });
    {
        let registry = app.world().resource::<SlotRegistry>();
        assert_eq!(registry.registered_mask().bits(), 0b1);
        assert_eq!(
            registry.unassigned_devices(),
            &[DeviceBinding::new(KEYBOARD, DeviceCapability::Keyboard)]
        );
    }

    let out = run_frame(&mut app, [ready(0, true)]);
    assert_eq!(out, vec![AllReady(false)]);

    let out = run_frame(
        &mut app,
        [
            LobbyInput::JoinIntent {
                device: KEYBOARD,
                capability: DeviceCapability::Keyboard,
            },
            ready(1, true),
        ],
    );
    assert_eq!(out, vec![SpawnRequested(Slot::new(1)), AllReady(true)]);
    assert!(app
        .world()
        .resource::<SlotRegistry>()
        .unassigned_devices()
        .is_empty());
}

#[test]
fn conflicting_initial_players_leave_lobby_misconfigured() {
    let app = lobby_app(LobbyConfig {
        initial_players: vec![InitialPlayer::new(
            Slot::new(9),
            pad(0),
            DeviceCapability::Joystick,
        )],
        ..Default::default()
    });
    assert!(matches!(
        app.world().resource::<LobbyStatus>(),
        LobbyStatus::Misconfigured(_)
    ));
}
