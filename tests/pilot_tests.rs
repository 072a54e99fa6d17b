mod common;

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use runewalker::control::{InputError, Key, NavigationError, RuneOutcome};
use runewalker::kernel::telemetry::event::{NavigationOutcome, TelemetryEvent};
use runewalker::kernel::time::Pacing;
use runewalker::vision::{Direction, Palette};
use runewalker::{Config, Pilot};

use common::{captcha_frame, controlled_at, overview_frame, FlakySink, RecordingSink, ScriptedSource};

use Direction::{Down, Left, Right, Up};

fn test_config() -> Config {
    let mut config = Config::default();
    config.pacing = Pacing::instant();
    config.rune.activate_delay_ms = 0;
    config.rune.capture_delay_ms = 0;
    config.session.patrol_interval_ms = 0;
    config
}

#[tokio::test]
async fn test_tick_warns_about_others_and_returns_to_anchor() {
    let palette = Palette::default();
    let frame = overview_frame(&[(palette.controlled, 96, 30), (palette.stranger, 10, 10)]);
    let mut pilot = Pilot::new(&test_config(), ScriptedSource::repeating(frame), RecordingSink::default());
    let cancel = CancellationToken::new();

    let report = pilot.tick(&cancel).await.unwrap();

    assert!(report.others_present);
    assert_eq!(report.rune, None);
    assert!(report.arrived);

    let snapshot = pilot.telemetry().snapshot();
    assert_eq!(snapshot.others_sighted, 1);
    assert_eq!(snapshot.navigation.arrivals, 1);
}

#[tokio::test]
async fn test_tick_clears_the_rune_before_patrolling() {
    let palette = Palette::default();
    let rune_visible = overview_frame(&[(palette.controlled, 40, 30), (palette.marker, 41, 31)]);
    let source = ScriptedSource::new(vec![
        Some(rune_visible.clone()), // others check
        Some(rune_visible.clone()), // marker check
        Some(rune_visible),         // navigate onto the marker
        Some(captcha_frame(&[Up, Right, Down, Left])),
        Some(controlled_at(96, 30)), // marker gone, then anchor reached
    ]);
    let mut pilot = Pilot::new(&test_config(), source, RecordingSink::default());
    let cancel = CancellationToken::new();

    let report = pilot.tick(&cancel).await.unwrap();

    assert_eq!(report.rune, Some(RuneOutcome::Solved { attempts: 1 }));
    assert!(report.arrived);
    assert!(!report.others_present);
    assert_eq!(
        pilot.keyboard().sink().downs(),
        vec![Key::Space, Key::Up, Key::Right, Key::Down, Key::Left, Key::Left, Key::Right]
    );

    // Two navigations: onto the marker, then back to the anchor.
    let outcomes: Vec<_> = pilot
        .telemetry()
        .events()
        .filter_map(|e| match e {
            TelemetryEvent::NavigationFinished { outcome, .. } => Some(*outcome),
            _ => None,
        })
        .collect();
    assert_eq!(outcomes, vec![NavigationOutcome::Arrived, NavigationOutcome::Arrived]);
}

#[tokio::test]
async fn test_unreachable_anchor_is_not_fatal() {
    let mut config = test_config();
    config.navigation.max_polls = 3;
    let mut pilot = Pilot::new(&config, ScriptedSource::repeating(controlled_at(10, 30)), RecordingSink::default());
    let cancel = CancellationToken::new();

    let report = pilot.tick(&cancel).await.unwrap();

    assert!(!report.arrived);
    assert!(pilot.keyboard().sink().held.is_empty());
    assert_eq!(pilot.telemetry().snapshot().navigation.not_converged, 1);
}

#[tokio::test]
async fn test_run_stops_cleanly_on_cancel() {
    let mut config = test_config();
    config.session.patrol_interval_ms = 10_000;
    let mut pilot = Pilot::new(&config, ScriptedSource::repeating(controlled_at(96, 30)), RecordingSink::default());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let result = pilot.run(&cancel).await;

    assert!(result.is_ok());
    assert!(pilot.keyboard().sink().held.is_empty());
    assert!(pilot.telemetry().snapshot().navigation.arrivals >= 1);
}

#[tokio::test]
async fn test_run_fails_on_device_error_with_nothing_held() {
    let palette = Palette::default();
    let rune_visible = overview_frame(&[(palette.controlled, 40, 30), (palette.marker, 41, 31)]);
    let source = ScriptedSource::new(vec![
        Some(rune_visible.clone()),
        Some(rune_visible.clone()),
        Some(rune_visible),
        Some(captcha_frame(&[Up, Up, Up, Up])),
    ]);
    let mut pilot = Pilot::new(&test_config(), source, FlakySink::failing_release_of(Key::Left));
    let cancel = CancellationToken::new();

    let result = pilot.run(&cancel).await;

    assert_eq!(result, Err(NavigationError::Input(InputError::Device("transient".into()))));
    assert!(pilot.keyboard().sink().inner.held.is_empty());
}
