//! Link loss and recovery as seen through the control loop.

use sentinela::app::events::AlarmEvent;
use sentinela::app::messages;
use sentinela::app::ports::ConnectivityPort;

use crate::mock_hw::{MemoryStore, OPERATOR_CHAT, Rig, SYNCED_EPOCH};

fn link_events(rig: &Rig) -> Vec<bool> {
    rig.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AlarmEvent::LinkChanged { up } => Some(*up),
            _ => None,
        })
        .collect()
}

#[test]
fn loss_and_restore_are_logged_once_each() {
    let mut rig = Rig::booted();
    assert!(rig.app.is_link_up());

    rig.wifi.sim_set_ap_reachable(false);
    rig.tick(10_000);
    assert!(!rig.app.is_link_up());

    // Still down at the next checks: console only.
    rig.tick(20_000);
    rig.tick(30_000);

    rig.wifi.sim_set_ap_reachable(true);
    rig.tick(40_000);
    assert!(rig.app.is_link_up());

    assert_eq!(
        rig.log_messages(),
        vec![
            messages::BOOT_RECORD,
            messages::LINK_CONNECTED,
            messages::LINK_LOST,
            messages::LINK_RESTORED,
        ]
    );
    assert_eq!(rig.bot.texts(), vec![messages::LINK_RESTORED_NOTICE]);
    assert_eq!(link_events(&rig), vec![true, false, true]);
}

#[test]
fn checks_are_interval_gated() {
    let mut rig = Rig::booted();
    rig.wifi.sim_set_ap_reachable(false);

    rig.tick(9_999);
    assert!(rig.app.is_link_up(), "no check before the interval");
    rig.tick(10_000);
    assert!(!rig.app.is_link_up());
}

#[test]
fn remote_is_not_polled_while_link_is_down() {
    let mut rig = Rig::booted();
    rig.wifi.sim_set_ap_reachable(false);
    rig.bot.say(OPERATOR_CHAT, "/armar");

    rig.tick(3_000);
    assert!(rig.bot.fetches.is_empty());

    rig.wifi.sim_set_ap_reachable(true);
    rig.tick(10_000);
    assert_eq!(rig.bot.fetches, vec![None]);
    assert!(rig.app.status().armed);
}

#[test]
fn failed_startup_connect_recovers_later() {
    let mut rig = Rig::unstarted(MemoryStore::default(), SYNCED_EPOCH);
    rig.wifi.sim_set_ap_reachable(false);
    rig.app.start(&mut rig.sink);
    assert!(!rig.app.establish_link(&mut rig.wifi, &mut rig.sink));
    assert!(!rig.wifi.is_up());

    rig.wifi.sim_set_ap_reachable(true);
    rig.tick(10_000);

    assert!(rig.app.is_link_up());
    assert_eq!(
        rig.log_messages(),
        vec![
            messages::BOOT_RECORD,
            messages::LINK_CONNECT_FAILED,
            messages::LINK_RESTORED,
        ]
    );
    assert_eq!(link_events(&rig), vec![false, true]);
}

#[test]
fn alarm_keeps_working_offline() {
    let mut rig = Rig::booted();
    rig.wifi.sim_set_ap_reachable(false);
    rig.tick(10_000);

    let arm = rig.config.radio_arm_code;
    rig.radio.inject_code(arm);
    rig.tick(10_010);
    rig.hw.motion = true;
    rig.tick(10_020);

    assert!(rig.app.status().triggered);
    assert!(rig.hw.siren);
}

#[test]
fn watchdog_is_fed_between_network_calls() {
    let mut rig = Rig::booted();
    rig.wifi.sim_set_ap_reachable(false);
    rig.tick(10_000);
    assert!(rig.bot.feeds_at_call.is_empty());

    // One tick that restores the link, fetches a chat command, answers it,
    // takes a radio arm and raises the alarm: five network calls.
    rig.wifi.sim_set_ap_reachable(true);
    rig.bot.say(OPERATOR_CHAT, "/status");
    let arm = rig.config.radio_arm_code;
    rig.radio.inject_code(arm);
    rig.hw.motion = true;
    rig.tick(20_000);

    assert!(rig.app.status().triggered);
    let calls = &rig.bot.feeds_at_call;
    assert_eq!(calls.len(), 5);
    assert!(
        calls.windows(2).all(|w| w[0] < w[1]),
        "two network calls without a feed in between: {calls:?}"
    );
    assert_eq!(calls[0] + 4, rig.wdt.feeds());
}
