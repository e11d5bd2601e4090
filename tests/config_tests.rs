//! Configuration files driving the engine

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use heartfelt::config::{find_config_from, load_config, write_default_config, ConfigError, CONFIG_FILE};
use heartfelt::dispatch::Event;
use heartfelt::media::HeadlessPlayer;
use heartfelt::models::Layer;
use heartfelt::{Greeting, MemorySurface, Surface};

#[test]
fn test_custom_config_drives_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(
        &path,
        r##"
[page]
seed = 7

[hearts]
initial = 5
cap = 6
interval_ms = 100

[confetti]
count = 3
palette = ["#fff"]
"##,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    let mut page = Greeting::new(config, MemorySurface::default(), HeadlessPlayer::default());
    page.start();
    assert_eq!(page.surface().count(Layer::Hearts), 5);

    page.advance(1000);
    assert_eq!(page.surface().count(Layer::Hearts), 6);

    page.dispatch(Event::key(' '));
    assert_eq!(page.surface().count(Layer::Confetti), 3);
    assert!(page.surface().decorations(Layer::Confetti).iter().all(|d| d.color == "#fff"));
}

#[test]
fn test_default_file_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    write_default_config(&path, false).unwrap();

    let loaded = load_config(Some(&path)).unwrap();
    assert_eq!(loaded, heartfelt::GreetingConfig::default());
    assert!(matches!(write_default_config(&path, false), Err(ConfigError::Exists(_))));
}

#[test]
fn test_invalid_config_reports_every_field() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE);
    fs::write(&path, "[hearts]\ncap = 0\n\n[modal]\ncolor = \"pink\"\n").unwrap();

    match load_config(Some(&path)) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("hearts.cap")));
            assert!(errors.iter().any(|e| e.contains("modal.color")));
        }
        other => panic!("expected validation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
#[serial]
fn test_config_found_from_nested_directory() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("site").join("assets");
    fs::create_dir_all(&nested).unwrap();
    fs::write(dir.path().join(CONFIG_FILE), "[page]\nvariant = \"simplified\"\n").unwrap();

    let found = find_config_from(nested).unwrap();
    assert_eq!(found, dir.path().join(CONFIG_FILE));

    let config = load_config(Some(&found)).unwrap();
    assert_eq!(config.page.variant, heartfelt::config::Variant::Simplified);
}
