use std::path::Path;

use runewalker::config::{Config, ConfigError};
use runewalker::control::Key;
use runewalker::vision::{ColourSignature, Position, Region};

#[test]
fn test_empty_file_gives_defaults() {
    let config = Config::from_toml_str("").unwrap();

    assert_eq!(config.window.target, "MapleStory");
    assert_eq!(config.regions.overview, Region::new(5, 60, 175, 70));
    assert_eq!(config.regions.captcha, Region::new(150, 150, 500, 125));
    assert_eq!(config.session.anchor, Position::new(97.0, 32.5));
    assert_eq!(config.keys.jump, Key::Space);
    assert_eq!(config.keys.climb, Key::Shift);
    assert_eq!(config.pacing.press_ms, 50);
    assert_eq!(config.pacing.settle_ms, 1_000);
    assert_eq!(config.decoder.claim_radius, 15);
    assert_eq!(config.navigation.x_tolerance, 2.0);
    assert_eq!(config.navigation.y_tolerance, 7.0);
}

#[test]
fn test_sections_override_only_what_they_name() {
    let raw = r#"
        [window]
        target = "Client"

        [palette]
        marker = [1, 2, 3, 255]

        [regions.overview]
        left = 0
        top = 0
        width = 200
        height = 100

        [decoder]
        claim_radius = 20

        [keys]
        jump = "alt"
        interact = "y"

        [session]
        anchor = { x = 50.0, y = 20.0 }
    "#;

    let config = Config::from_toml_str(raw).unwrap();

    assert_eq!(config.window.target, "Client");
    assert_eq!(config.palette.marker, ColourSignature::rgba(1, 2, 3, 255));
    assert_eq!(config.palette.controlled, ColourSignature::rgba(255, 221, 68, 255));
    assert_eq!(config.regions.overview, Region::new(0, 0, 200, 100));
    assert_eq!(config.decoder.claim_radius, 20);
    assert_eq!(config.decoder.walk_length, 30);
    assert_eq!(config.keys.jump, Key::Alt);
    assert_eq!(config.keys.interact, Key::Char('Y'));
    assert_eq!(config.keys.climb, Key::Shift);
    assert_eq!(config.session.anchor, Position::new(50.0, 20.0));
    assert_eq!(config.session.patrol_interval_ms, 500);
}

#[test]
fn test_unknown_key_is_rejected() {
    let err = Config::from_toml_str("[keys]\njump = \"hyper\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let err = Config::load(Path::new("/definitely/not/here/runewalker.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
