//! Settings Tests
//!
//! Tests for:
//! - Default constants
//! - Partial JSON overrides
//! - Validation failures

use glam::{Vec2, Vec3};

use puppet::errors::RetargetError;
use puppet::settings::RetargetSettings;

#[test]
fn defaults_match_tuned_values() {
    let s = RetargetSettings::default();

    assert_eq!(s.rates.face, 8.0);
    assert_eq!(s.rates.blink, 8.0);
    assert_eq!(s.rates.eye, 4.0);
    assert_eq!(s.rates.body, 4.0);
    assert_eq!(s.rates.hand, 10.0);

    assert_eq!(s.damping.head, Vec3::splat(0.5));
    assert_eq!(s.damping.torso, Vec3::splat(0.25));
    assert_eq!(s.damping.hips, Vec3::splat(0.5));
    assert_eq!(s.damping.limbs, Vec3::ONE);

    assert_eq!(s.crossfade.fade_out, 0.3);
    assert_eq!(s.crossfade.fade_in, 0.8);
    assert_eq!(s.gaze_gain, Vec2::splat(1.5));
    assert!(s.validate().is_ok());
}

#[test]
fn partial_json_overrides_only_listed_fields() -> anyhow::Result<()> {
    let s = RetargetSettings::from_json_str(
        r#"{
            "rates": { "hand": 12.0 },
            "crossfade": { "fade_in": 1.5 },
            "stale_timeout": 1.0
        }"#,
    )?;

    assert_eq!(s.rates.hand, 12.0);
    assert_eq!(s.rates.body, 4.0);
    assert_eq!(s.crossfade.fade_in, 1.5);
    assert_eq!(s.crossfade.fade_out, 0.3);
    assert_eq!(s.stale_timeout, 1.0);
    Ok(())
}

#[test]
fn serialized_settings_load_back() -> anyhow::Result<()> {
    let mut original = RetargetSettings::default();
    original.damping.torso = Vec3::new(0.2, 0.3, 0.4);
    original.solver.image_size = (1280, 720);

    let loaded = RetargetSettings::from_json_str(&original.to_json_string()?)?;
    assert_eq!(loaded, original);
    Ok(())
}

#[test]
fn negative_rate_is_rejected() {
    let err = RetargetSettings::from_json_str(r#"{ "rates": { "face": -1.0 } }"#).unwrap_err();
    assert!(matches!(err, RetargetError::InvalidSettings(ref msg) if msg.contains("rates.face")));
}

#[test]
fn inverted_blink_thresholds_are_rejected() {
    let mut s = RetargetSettings::default();
    s.solver.blink_thresholds = (0.8, 0.2);
    assert!(matches!(s.validate(), Err(RetargetError::InvalidSettings(_))));
}

#[test]
fn zero_image_size_is_rejected() {
    let mut s = RetargetSettings::default();
    s.solver.image_size = (0, 480);
    assert!(s.validate().is_err());
}

#[test]
fn non_finite_damping_is_rejected() {
    let mut s = RetargetSettings::default();
    s.damping.hips = Vec3::new(f32::NAN, 0.5, 0.5);
    assert!(s.validate().is_err());
}

#[test]
fn malformed_json_is_a_json_error() {
    let err = RetargetSettings::from_json_str("{ rates: ").unwrap_err();
    assert!(matches!(err, RetargetError::JsonError(_)));
}
