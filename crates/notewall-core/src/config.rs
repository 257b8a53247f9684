//! Engine configuration.
//!
//! Every tunable constant of the engine lives here so hosts can override them
//! from a JSON file. `EngineConfig::default()` carries the stock values.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Minimum width of an item or frame, in world units.
pub const MIN_WIDTH: f64 = 320.0;
/// Minimum height of an item or frame, in world units.
pub const MIN_HEIGHT: f64 = 220.0;
/// Smallest allowed camera scale.
pub const MIN_ZOOM: f64 = 0.25;
/// Largest allowed camera scale.
pub const MAX_ZOOM: f64 = 2.5;
/// Base of the wheel zoom curve: `factor = ZOOM_BASE^(-delta_y)`.
pub const ZOOM_BASE: f64 = 1.0015;
/// Delay between the first pending write and the automatic flush.
pub const FLUSH_DELAY_MS: u64 = 250;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a whiteboard engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum item/frame width in world units.
    pub min_width: f64,
    /// Minimum item/frame height in world units.
    pub min_height: f64,
    /// Lower camera scale bound.
    pub min_zoom: f64,
    /// Upper camera scale bound.
    pub max_zoom: f64,
    /// Wheel zoom base.
    pub zoom_base: f64,
    /// Debounce delay for persistence flushes, in milliseconds.
    pub flush_delay_ms: u64,
    /// Height of the drag header strip at the top of items and frames (world units).
    pub header_height: f64,
    /// Thickness of the resize bands along each edge (screen pixels).
    pub handle_thickness: f64,
    /// Key name that enables canvas panning while held.
    pub pan_key: String,
    /// Maximum interval between the two presses of a double-click.
    pub double_click_ms: u64,
    /// Maximum distance between the two presses of a double-click (screen pixels).
    pub double_click_distance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_WIDTH,
            min_height: MIN_HEIGHT,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            zoom_base: ZOOM_BASE,
            flush_delay_ms: FLUSH_DELAY_MS,
            header_height: 36.0,
            handle_thickness: 8.0,
            pan_key: " ".to_string(),
            double_click_ms: 500,
            double_click_distance: 5.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON. Missing fields take their default value.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Reject configurations that would break the engine invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let reals = [
            ("min_width", self.min_width),
            ("min_height", self.min_height),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("zoom_base", self.zoom_base),
            ("header_height", self.header_height),
            ("handle_thickness", self.handle_thickness),
            ("double_click_distance", self.double_click_distance),
        ];
        if let Some((name, value)) = reals.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::Invalid(format!("{name} must be finite, got {value}")));
        }
        if !(self.min_width > 0.0 && self.min_height > 0.0) {
            return Err(ConfigError::Invalid("minimum size must be positive".into()));
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::Invalid(format!(
                "zoom bounds [{}, {}] are inverted or non-positive",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_base <= 1.0 {
            return Err(ConfigError::Invalid("zoom base must exceed 1.0".into()));
        }
        if self.flush_delay_ms == 0 {
            return Err(ConfigError::Invalid("flush delay must be non-zero".into()));
        }
        if self.pan_key.is_empty() {
            return Err(ConfigError::Invalid("pan key must be set".into()));
        }
        Ok(())
    }

    /// Debounce delay as a `Duration`.
    pub fn flush_delay(&self) -> Duration {
        Duration::from_millis(self.flush_delay_ms)
    }

    /// Double-click window as a `Duration`.
    pub fn double_click_window(&self) -> Duration {
        Duration::from_millis(self.double_click_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.min_width, MIN_WIDTH);
        assert_eq!(config.min_height, MIN_HEIGHT);
        assert_eq!(config.flush_delay(), Duration::from_millis(250));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "flush_delay_ms": 100 }"#).unwrap();
        assert_eq!(config.flush_delay_ms, 100);
        assert_eq!(config.max_zoom, MAX_ZOOM);
        assert_eq!(config.pan_key, " ");
    }

    #[test]
    fn test_inverted_zoom_rejected() {
        let result = EngineConfig::from_json_str(r#"{ "min_zoom": 3.0, "max_zoom": 2.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_finite_field_rejected() {
        let config = EngineConfig { zoom_base: f64::NAN, ..EngineConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        let config = EngineConfig { max_zoom: f64::INFINITY, ..EngineConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = EngineConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = EngineConfig::load(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
