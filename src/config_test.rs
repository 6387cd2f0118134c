#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

// =============================================================
// Defaults
// =============================================================

#[test]
fn defaults_match_constants() {
    let c = EngineConfig::default();
    assert_eq!(c.hover.update_delay_ms, HOVER_UPDATE_DELAY_MS);
    assert_eq!(c.hover.activation_delay_ms, HOVER_ACTIVATION_DELAY_MS);
    assert_eq!(c.drag.drop_target_delay_ms, DROP_TARGET_DELAY_MS);
    assert_eq!(c.drag.style_replace_delay_ms, STYLE_REPLACE_DELAY_MS);
    assert_eq!(c.solver.grid_size, GRID_SIZE);
    assert_eq!(c.graph_tolerance, GRAPH_TOLERANCE_PX);
    assert!(c.solver.grid_enabled);
    assert!(c.drag.style_replace_enabled);
    assert!(!c.drag.keep_target_appearance);
}

#[test]
fn defaults_validate() {
    assert!(EngineConfig::default().validate().is_ok());
}

// =============================================================
// JSON
// =============================================================

#[test]
fn from_json_empty_object_is_default() {
    let c = EngineConfig::from_json("{}").unwrap();
    assert_eq!(c, EngineConfig::default());
}

#[test]
fn from_json_partial_override_keeps_rest() {
    let c = EngineConfig::from_json(r#"{"hover": {"update_delay_ms": 250}, "solver": {"grid_enabled": false}}"#).unwrap();
    assert_eq!(c.hover.update_delay_ms, 250);
    assert_eq!(c.hover.activation_delay_ms, HOVER_ACTIVATION_DELAY_MS);
    assert!(!c.solver.grid_enabled);
    assert_eq!(c.solver.grid_size, GRID_SIZE);
}

#[test]
fn from_json_malformed_is_parse_error() {
    let err = EngineConfig::from_json("{not json").unwrap_err();
    assert_eq!(err.error_code(), "E_CONFIG_PARSE");
}

#[test]
fn from_json_rejects_zero_grid() {
    let err = EngineConfig::from_json(r#"{"solver": {"grid_size": 0}}"#).unwrap_err();
    assert_eq!(err.error_code(), "E_CONFIG_VALUE");
    assert!(err.to_string().contains("solver.grid_size"));
}

#[test]
fn validate_rejects_negative_tolerance() {
    let c = EngineConfig { graph_tolerance: -1.0, ..EngineConfig::default() };
    assert!(matches!(c.validate(), Err(ConfigError::InvalidValue { key, .. }) if key == "graph_tolerance"));
}

#[test]
fn validate_rejects_opacity_over_hundred() {
    let mut c = EngineConfig::default();
    c.drag.inactive_opacity = 150;
    assert!(c.validate().is_err());
}

// =============================================================
// Environment
// =============================================================

#[test]
fn env_parse_missing_key_uses_default() {
    assert_eq!(env_parse("DROP_CONNECT_TEST_SURELY_UNSET_KEY", 42_u64), 42);
}

#[test]
fn from_env_without_overrides_validates() {
    assert!(EngineConfig::from_env().is_ok());
}
