//! Engine configuration: delays, sizes, and geometry defaults.
//!
//! Defaults come from [`crate::consts`]. A host can override any subset from a
//! JSON document (`EngineConfig::from_json`) or from `DROP_CONNECT_*`
//! environment variables (`EngineConfig::from_env`).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::Deserialize;

use crate::consts::{
    ARROW_DEPTH_PX, ARROW_LENGTH_PX, ARROW_SPACING_PX, BADGE_SIZE_PX, CLICK_TOLERANCE_PX, COLLISION_SIZE_RATIO,
    DEFAULT_EDGE_LENGTH, DRAG_HANDLE_SIZE_PX, DROP_TARGET_DELAY_MS, ENDPOINT_RADIUS_PX, GRAPH_TOLERANCE_PX, GRID_SIZE,
    HOVER_ACTIVATION_DELAY_MS, HOVER_UPDATE_DELAY_MS, INACTIVE_OPACITY, MIN_MATCH_SIZE, NEIGHBOUR_PROBE,
    STYLE_REPLACE_DELAY_MS,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl ConfigError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_CONFIG_PARSE",
            Self::InvalidValue { .. } => "E_CONFIG_VALUE",
        }
    }
}

/// Hover arrows around an idle target.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HoverConfig {
    pub update_delay_ms: u64,
    pub activation_delay_ms: u64,
    pub arrow_spacing: f64,
    pub arrow_length: f64,
    pub arrow_depth: f64,
    pub drag_handle_size: f64,
    /// Extra slop around each arrow for touch input.
    pub tolerance: f64,
    pub check_collisions: bool,
    pub collision_size_ratio: f64,
    pub click_tolerance: f64,
}

impl Default for HoverConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: HOVER_UPDATE_DELAY_MS,
            activation_delay_ms: HOVER_ACTIVATION_DELAY_MS,
            arrow_spacing: ARROW_SPACING_PX,
            arrow_length: ARROW_LENGTH_PX,
            arrow_depth: ARROW_DEPTH_PX,
            drag_handle_size: DRAG_HANDLE_SIZE_PX,
            tolerance: 0.0,
            check_collisions: true,
            collision_size_ratio: COLLISION_SIZE_RATIO,
            click_tolerance: CLICK_TOLERANCE_PX,
        }
    }
}

/// Drop affordances during a drag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    pub drop_target_delay_ms: u64,
    pub style_replace_delay_ms: u64,
    pub arrow_length: f64,
    pub arrow_depth: f64,
    pub badge_size: f64,
    pub endpoint_radius: f64,
    pub inactive_opacity: u8,
    pub style_replace_enabled: bool,
    /// Keep the target's own colours and fonts when replacing its style.
    pub keep_target_appearance: bool,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            drop_target_delay_ms: DROP_TARGET_DELAY_MS,
            style_replace_delay_ms: STYLE_REPLACE_DELAY_MS,
            arrow_length: ARROW_LENGTH_PX,
            arrow_depth: ARROW_DEPTH_PX,
            badge_size: BADGE_SIZE_PX,
            endpoint_radius: ENDPOINT_RADIUS_PX,
            inactive_opacity: INACTIVE_OPACITY,
            style_replace_enabled: true,
            keep_target_appearance: false,
        }
    }
}

/// Placement of new and connected cells.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub default_edge_length: f64,
    pub grid_size: f64,
    pub grid_enabled: bool,
    pub min_match_size: f64,
    pub neighbour_probe: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            default_edge_length: DEFAULT_EDGE_LENGTH,
            grid_size: GRID_SIZE,
            grid_enabled: true,
            min_match_size: MIN_MATCH_SIZE,
            neighbour_probe: NEIGHBOUR_PROBE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hover: HoverConfig,
    pub drag: DragConfig,
    pub solver: SolverConfig,
    /// Hit slop in screen pixels.
    pub graph_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hover: HoverConfig::default(),
            drag: DragConfig::default(),
            solver: SolverConfig::default(),
            graph_tolerance: GRAPH_TOLERANCE_PX,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON document over the defaults.
    ///
    /// # Errors
    ///
    /// `Parse` for malformed JSON, `InvalidValue` if a value fails validation.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Build config from environment variables over the defaults.
    ///
    /// Optional:
    /// - `DROP_CONNECT_HOVER_UPDATE_DELAY_MS`: default 500
    /// - `DROP_CONNECT_HOVER_ACTIVATION_DELAY_MS`: default 140
    /// - `DROP_CONNECT_DROP_TARGET_DELAY_MS`: default 200
    /// - `DROP_CONNECT_STYLE_REPLACE_DELAY_MS`: default 1500
    /// - `DROP_CONNECT_DEFAULT_EDGE_LENGTH`: default 80
    /// - `DROP_CONNECT_GRID_SIZE`: default 10
    /// - `DROP_CONNECT_GRAPH_TOLERANCE`: default 4
    ///
    /// Unparseable values fall back to the default.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if a parsed value fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.hover.update_delay_ms = env_parse("DROP_CONNECT_HOVER_UPDATE_DELAY_MS", config.hover.update_delay_ms);
        config.hover.activation_delay_ms =
            env_parse("DROP_CONNECT_HOVER_ACTIVATION_DELAY_MS", config.hover.activation_delay_ms);
        config.drag.drop_target_delay_ms = env_parse("DROP_CONNECT_DROP_TARGET_DELAY_MS", config.drag.drop_target_delay_ms);
        config.drag.style_replace_delay_ms =
            env_parse("DROP_CONNECT_STYLE_REPLACE_DELAY_MS", config.drag.style_replace_delay_ms);
        config.solver.default_edge_length =
            env_parse("DROP_CONNECT_DEFAULT_EDGE_LENGTH", config.solver.default_edge_length);
        config.solver.grid_size = env_parse("DROP_CONNECT_GRID_SIZE", config.solver.grid_size);
        config.graph_tolerance = env_parse("DROP_CONNECT_GRAPH_TOLERANCE", config.graph_tolerance);
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controllers cannot work with.
    ///
    /// # Errors
    ///
    /// `InvalidValue` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("solver.grid_size", self.solver.grid_size),
            ("solver.default_edge_length", self.solver.default_edge_length),
            ("hover.arrow_length", self.hover.arrow_length),
            ("hover.arrow_depth", self.hover.arrow_depth),
            ("drag.arrow_length", self.drag.arrow_length),
            ("drag.arrow_depth", self.drag.arrow_depth),
            ("drag.badge_size", self.drag.badge_size),
        ];
        for (key, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { key: key.to_owned(), value: value.to_string() });
            }
        }
        if !self.graph_tolerance.is_finite() || self.graph_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "graph_tolerance".to_owned(),
                value: self.graph_tolerance.to_string(),
            });
        }
        if self.drag.inactive_opacity > 100 {
            return Err(ConfigError::InvalidValue {
                key: "drag.inactive_opacity".to_owned(),
                value: self.drag.inactive_opacity.to_string(),
            });
        }
        Ok(())
    }
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or(default),
        Err(_) => default,
    }
}
