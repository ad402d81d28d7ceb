use std::io::Cursor;
use std::time::Duration;

use super::*;

#[test]
fn defaults_match_documented_values() {
    let cfg = ShowcaseConfig::default();
    assert_eq!(cfg.photo.width, 530.0);
    assert_eq!(cfg.photo.height, 1000.0);
    assert_eq!(cfg.camera.fov_deg, 45.0);
    assert_eq!(cfg.camera.margin, 120.0);
    assert_eq!(cfg.fisheye.radius, 800.0);
    assert_eq!(cfg.timings.layout_transition(), Duration::from_secs(5));
    assert_eq!(cfg.timings.spawn_delay(), Duration::from_millis(3000));
    assert_eq!(cfg.timings.bounds_debounce(), Duration::from_millis(100));
    cfg.validate().unwrap();
}

#[test]
fn showcase_pause_follows_spawn_delay() {
    let mut t = AnimationTimings::default();
    assert_eq!(t.showcase_pause(), Duration::from_millis(2000));
    t.spawn_delay_ms = 500;
    assert_eq!(t.showcase_pause(), Duration::from_millis(500));
    t.showcase_pause_ms = Some(50);
    assert_eq!(t.showcase_pause(), Duration::from_millis(50));
}

#[test]
fn partial_json_fills_in_defaults() {
    let json = r#"{ "photo": { "width": 400 }, "fisheye": { "enabled": false }, "grid": { "random": false } }"#;
    let cfg = ShowcaseConfig::from_reader(Cursor::new(json)).unwrap();
    assert_eq!(cfg.photo.width, 400.0);
    assert_eq!(cfg.photo.height, 1000.0);
    assert!(!cfg.fisheye.enabled);

    let grid = cfg.grid_opts();
    assert!(!grid.random);
    assert_eq!(grid.photo_width, 400.0);
    assert_eq!(cfg.circle_packing_opts().photo_width, 400.0);
    assert_eq!(cfg.side_opts().packing.photo_width, 400.0);
    assert_eq!(cfg.region_opts().photo_width, 400.0);
}

#[test]
fn validation_rejects_bad_values() {
    for json in [
        r#"{ "photo": { "width": 0 } }"#,
        r#"{ "camera": { "fov_deg": 180 } }"#,
        r#"{ "camera": { "fov_deg": -5 } }"#,
        r#"{ "fisheye": { "radius": 0 } }"#,
    ] {
        let err = ShowcaseConfig::from_reader(Cursor::new(json)).unwrap_err();
        assert!(matches!(err, ShowcaseError::Validation(_)), "{json}");
    }
    assert!(ShowcaseConfig::from_reader(Cursor::new("{ not json")).is_err());
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = ShowcaseConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open showcase config"));
}
