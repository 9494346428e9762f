//! End-to-end command flows through the control loop.

use sentinela::app::commands::{Command, CommandKind, CommandSource};
use sentinela::app::controller::AlarmPhase;
use sentinela::app::events::AlarmEvent;
use sentinela::app::messages;
use sentinela::app::ports::TextFormat;

use crate::mock_hw::{MemoryStore, OPERATOR_CHAT, Outbound, Rig, SYNCED_EPOCH};

fn phase_changes(rig: &Rig) -> Vec<(AlarmPhase, AlarmPhase)> {
    rig.sink
        .events
        .iter()
        .filter_map(|e| match e {
            AlarmEvent::PhaseChanged { from, to } => Some((*from, *to)),
            _ => None,
        })
        .collect()
}

#[test]
fn chat_arm_then_motion_then_radio_disarm() {
    let mut rig = Rig::booted();
    rig.bot.say(OPERATOR_CHAT, "/armar");

    rig.tick(1_000);
    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed, "remote poll not due yet");

    rig.tick(3_000);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedIdle);

    rig.hw.motion = true;
    rig.tick(3_010);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedTriggered);
    assert!(rig.hw.siren);

    // Still moving: no repeated alert while the siren rings.
    rig.tick(3_020);
    rig.tick(3_030);

    let disarm = rig.config.radio_disarm_code;
    rig.radio.inject_code(disarm);
    rig.tick(3_040);
    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert!(!rig.hw.siren);

    assert_eq!(
        rig.bot.texts(),
        vec![
            messages::armed(CommandSource::Chat).as_str(),
            messages::ALARM_TRIGGERED,
            messages::disarmed(CommandSource::Radio).as_str(),
        ]
    );
    assert_eq!(
        rig.log_messages(),
        vec![
            messages::BOOT_RECORD.to_owned(),
            messages::LINK_CONNECTED.to_owned(),
            messages::armed(CommandSource::Chat),
            messages::ALARM_TRIGGERED_RECORD.to_owned(),
            messages::disarmed(CommandSource::Radio),
        ]
    );
    assert_eq!(
        phase_changes(&rig),
        vec![
            (AlarmPhase::Disarmed, AlarmPhase::ArmedIdle),
            (AlarmPhase::ArmedIdle, AlarmPhase::ArmedTriggered),
            (AlarmPhase::ArmedTriggered, AlarmPhase::Disarmed),
        ]
    );
}

#[test]
fn foreign_chat_is_ignored() {
    let mut rig = Rig::booted();
    rig.bot.say(OPERATOR_CHAT + 1, "/armar");
    rig.tick(3_000);
    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert!(rig.bot.outbox.is_empty());

    rig.bot.say(OPERATOR_CHAT, "/status");
    rig.tick(6_000);
    assert_eq!(rig.bot.fetches, vec![None, Some(1)]);
    assert_eq!(
        rig.bot.outbox,
        vec![Outbound::Text(
            messages::status_report(rig.app.status()),
            TextFormat::RichText
        )]
    );
}

#[test]
fn one_remote_command_per_tick() {
    let mut rig = Rig::booted();
    rig.bot.say(OPERATOR_CHAT, "/armar");
    rig.bot.say(OPERATOR_CHAT, "/status");

    rig.tick(3_000);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedIdle);
    assert_eq!(rig.bot.outbox.len(), 1);

    rig.tick(3_010);
    assert_eq!(rig.bot.fetches.len(), 1, "queued batch is drained before the next fetch");
    let status = rig.bot.texts()[1];
    assert!(status.contains("*Sistema:* ARMADO"));
    assert!(status.contains("*Sirene Disparada:* NÃO"));
}

#[test]
fn unknown_chat_text_gets_help() {
    let mut rig = Rig::booted();
    rig.bot.say(OPERATOR_CHAT, "/ARMAR");
    rig.tick(3_000);
    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert_eq!(rig.bot.texts(), vec![messages::help().as_str()]);
}

#[test]
fn button_press_toggles_through_bounce() {
    let mut rig = Rig::booted();

    // Contact bounce, then held.
    for (t, level) in [(100, false), (103, true), (106, false)] {
        rig.hw.button_level = level;
        rig.tick(t);
    }
    rig.tick(150);
    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed, "held only 44 ms");
    rig.tick(156);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedIdle);

    // Keeping it pressed does nothing more.
    rig.tick(400);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedIdle);

    rig.hw.button_level = true;
    rig.tick(500);
    rig.tick(550);
    rig.hw.button_level = false;
    rig.tick(600);
    rig.tick(650);
    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);

    let log = rig.log_messages();
    assert_eq!(
        &log[2..],
        &[
            messages::armed(CommandSource::Button),
            messages::disarmed(CommandSource::Button),
        ]
    );
}

#[test]
fn log_request_sends_the_file_verbatim() {
    let mut rig = Rig::booted();
    rig.bot.say(OPERATOR_CHAT, "/logs");
    rig.tick(3_000);

    let stored = rig.app.event_log().store().bytes.clone();
    let files = rig.bot.files();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].0, stored.as_slice());
    assert_eq!(files[0].1, messages::LOG_EXPORT_FILENAME);
}

#[test]
fn log_request_on_empty_log_says_so() {
    let mut rig = Rig::unstarted(MemoryStore::default(), SYNCED_EPOCH);
    rig.app.dispatch(
        Command::from_chat_text("/logs"),
        &mut rig.hw,
        &mut rig.bot,
        &mut rig.sink,
    );
    assert_eq!(rig.bot.texts(), vec![messages::LOG_EMPTY]);
    assert!(rig.bot.files().is_empty());
}

#[test]
fn broken_storage_never_blocks_the_alarm() {
    let store = MemoryStore {
        broken: true,
        ..MemoryStore::default()
    };
    let mut rig = Rig::booted_with(store, SYNCED_EPOCH);

    let arm = rig.config.radio_arm_code;
    rig.radio.inject_code(arm);
    rig.tick(10);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedIdle);

    rig.bot.say(OPERATOR_CHAT, "/logs");
    rig.tick(3_000);
    assert_eq!(rig.bot.texts().last(), Some(&messages::LOG_UNREADABLE));
}

#[test]
fn disarm_is_idempotent_but_always_recorded() {
    let mut rig = Rig::booted();
    let disarm = rig.config.radio_disarm_code;

    rig.radio.inject_code(disarm);
    rig.tick(10);

    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert_eq!(rig.hw.siren_writes, vec![false]);
    assert_eq!(
        rig.log_messages().last(),
        Some(&messages::disarmed(CommandSource::Radio))
    );
    assert!(phase_changes(&rig).is_empty());
    assert!(rig.sink.events.contains(&AlarmEvent::CommandReceived {
        kind: CommandKind::Disarm,
        source: CommandSource::Radio,
    }));
}

#[test]
fn arming_twice_writes_one_record() {
    let mut rig = Rig::booted();
    let arm = rig.config.radio_arm_code;

    rig.radio.inject_code(arm);
    rig.tick(10);
    rig.radio.inject_code(arm);
    rig.tick(20);

    assert_eq!(
        rig.bot.texts(),
        vec![messages::armed(CommandSource::Radio).as_str(), messages::ALREADY_ARMED]
    );
    let armed_records = rig
        .log_messages()
        .iter()
        .filter(|m| **m == messages::armed(CommandSource::Radio))
        .count();
    assert_eq!(armed_records, 1);
}

#[test]
fn unknown_radio_code_is_logged_not_notified() {
    let mut rig = Rig::booted();
    rig.radio.inject_code(99);
    rig.tick(10);

    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert!(rig.bot.outbox.is_empty());
    assert_eq!(
        rig.log_messages().last(),
        Some(&messages::unknown_radio_code(99))
    );
}

#[test]
fn failed_notifications_do_not_undo_transitions() {
    let mut rig = Rig::booted();
    rig.bot.offline = true;

    let arm = rig.config.radio_arm_code;
    rig.radio.inject_code(arm);
    rig.tick(10);
    rig.hw.motion = true;
    rig.tick(20);

    assert_eq!(rig.app.phase(), AlarmPhase::ArmedTriggered);
    assert!(rig.hw.siren);
    assert!(rig.log_messages().contains(&messages::ALARM_TRIGGERED_RECORD.to_owned()));
}

#[test]
fn record_timestamps_follow_clock_sync() {
    let unsynced = Rig::booted_with(MemoryStore::default(), 0);
    let records = unsynced.app.event_log().records().unwrap();
    assert_eq!(records[0].timestamp, "sincronizando relogio...");

    let synced = Rig::booted();
    let records = synced.app.event_log().records().unwrap();
    // 12:00 UTC in the default BRT offset.
    assert_eq!(records[0].timestamp, "2025-06-12 09:00:00");
}

#[test]
fn button_silences_a_triggered_alarm_then_rearms() {
    let mut rig = Rig::booted();
    let arm = rig.config.radio_arm_code;
    rig.radio.inject_code(arm);
    rig.tick(10);
    rig.hw.motion = true;
    rig.tick(20);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedTriggered);
    rig.hw.motion = false;

    rig.hw.button_level = false;
    rig.tick(100);
    rig.tick(150);
    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert!(!rig.hw.siren);

    rig.hw.button_level = true;
    rig.tick(200);
    rig.tick(250);
    rig.hw.button_level = false;
    rig.tick(300);
    rig.tick(350);
    assert_eq!(rig.app.phase(), AlarmPhase::ArmedIdle);
}

#[test]
fn disarm_lands_before_same_tick_motion() {
    let mut rig = Rig::booted();
    let (arm, disarm) = (rig.config.radio_arm_code, rig.config.radio_disarm_code);
    rig.radio.inject_code(arm);
    rig.tick(10);

    rig.radio.inject_code(disarm);
    rig.hw.motion = true;
    rig.tick(20);

    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert!(!rig.hw.siren);
    assert!(!rig.log_messages().contains(&messages::ALARM_TRIGGERED_RECORD.to_owned()));
    assert!(!rig.bot.texts().contains(&messages::ALARM_TRIGGERED));

    // Same from the chat, which is read even earlier in the tick.
    rig.radio.inject_code(arm);
    rig.hw.motion = false;
    rig.tick(30);
    rig.bot.say(OPERATOR_CHAT, "/desarmar");
    rig.hw.motion = true;
    rig.tick(3_000);

    assert_eq!(rig.app.phase(), AlarmPhase::Disarmed);
    assert!(!rig.bot.texts().contains(&messages::ALARM_TRIGGERED));
}

#[test]
fn arm_and_motion_in_one_tick_trigger_at_once() {
    let mut rig = Rig::booted();
    let arm = rig.config.radio_arm_code;
    rig.radio.inject_code(arm);
    rig.hw.motion = true;
    rig.tick(10);

    assert_eq!(rig.app.phase(), AlarmPhase::ArmedTriggered);
    assert!(rig.hw.siren);
    assert_eq!(
        rig.bot.texts(),
        vec![messages::armed(CommandSource::Radio).as_str(), messages::ALARM_TRIGGERED]
    );
    assert_eq!(
        &rig.log_messages()[2..],
        &[
            messages::armed(CommandSource::Radio),
            messages::ALARM_TRIGGERED_RECORD.to_owned(),
        ]
    );
}
