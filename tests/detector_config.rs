use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use ripeness_detector::config::{ConfigOverrides, DetectorConfig};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "RIPENESS_CONFIG",
        "RIPENESS_CAMERA",
        "RIPENESS_MQTT_BROKER",
        "RIPENESS_MQTT_TOPIC",
        "RIPENESS_MQTT_CLIENT_ID",
        "RIPENESS_PUBLISH",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let toml = r#"
        [camera]
        source = "stub://bench"

        [mqtt]
        broker_addr = "broker.local:1884"
        topic = "farm/row3"
        username = "picker"
        password = "secret"

        [display]
        headless = true

        [runtime]
        health_interval_secs = 12
    "#;
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");

    std::env::set_var("RIPENESS_CONFIG", file.path());
    std::env::set_var("RIPENESS_MQTT_TOPIC", "farm/row4");
    std::env::set_var("RIPENESS_MQTT_CLIENT_ID", "row4_cam");

    let cfg = DetectorConfig::load().expect("load config");
    clear_env();

    assert_eq!(cfg.camera, "stub://bench");
    assert!(cfg.mqtt.enabled);
    assert_eq!(cfg.mqtt.broker_addr, "broker.local:1884");
    assert_eq!(cfg.mqtt.topic, "farm/row4");
    assert_eq!(cfg.mqtt.client_id, "row4_cam");
    assert!(cfg.headless);
    assert_eq!(cfg.health_interval, Duration::from_secs(12));

    let settings = cfg.mqtt.settings().expect("mqtt settings");
    assert_eq!(settings.endpoint.host, "broker.local");
    assert_eq!(settings.endpoint.port, 1884);
    assert_eq!(settings.username.as_deref(), Some("picker"));
    assert_eq!(settings.password.as_deref(), Some("secret"));
}

#[test]
fn env_can_disable_publishing() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("RIPENESS_PUBLISH", "false");
    std::env::set_var("RIPENESS_CAMERA", "stub://env");
    let cfg = DetectorConfig::load_from(None).expect("load config");
    clear_env();

    assert!(!cfg.mqtt.enabled);
    assert_eq!(cfg.camera, "stub://env");
}

#[test]
fn rejects_bad_publish_flag() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("RIPENESS_PUBLISH", "sometimes");
    let result = DetectorConfig::load_from(None);
    clear_env();

    assert!(result.is_err());
}

#[test]
fn rejects_unknown_config_keys() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, b"[camera]\nsource = \"0\"\nfps = 30\n")
        .expect("write config");

    let err = DetectorConfig::load_from(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("invalid config file"));
}

#[test]
fn missing_config_file_is_an_error() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("absent.toml");
    assert!(DetectorConfig::load_from(Some(&missing)).is_err());
}

#[test]
fn command_line_overrides_apply_before_validation() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, b"[camera]\nsource = \"rtsp://cam\"\n")
        .expect("write config");
    std::env::set_var("RIPENESS_MQTT_BROKER", "http://x");

    let mut cfg = DetectorConfig::load_from(Some(file.path())).expect("unvalidated load");
    clear_env();
    assert!(cfg.validate().is_err());

    cfg.apply_overrides(&ConfigOverrides {
        camera: Some("0".to_string()),
        no_publish: true,
        ..ConfigOverrides::default()
    });
    cfg.validate().expect("overrides fix the bad file and env values");
    assert_eq!(cfg.camera, "0");
    assert!(!cfg.mqtt.enabled);
    assert_eq!(cfg.mqtt.broker_addr, "http://x");
}

#[test]
fn load_validates_the_merged_result() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("RIPENESS_MQTT_BROKER", "http://x");
    let result = DetectorConfig::load();
    clear_env();

    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("invalid MQTT broker address"));
}
