//! Engine configuration.
//!
//! Everything tunable lives in [`EngineConfig`], which can be saved to and
//! loaded from JSON. Missing fields take their defaults, so a config file only
//! needs to name what it changes:
//!
//! ```json
//! {
//!   "area": { "size": [1024.0, 768.0] },
//!   "palette": "Viridis",
//!   "animation": { "fps": 24.0, "looping": true }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::color::PaletteMode;
use crate::driver::AnimationConfig;
use crate::error::ConfigError;
use crate::force::ForceConfig;
use crate::particle::Bounds;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation area shared by both engines.
    pub area: Bounds,
    /// Palette for particle colors.
    pub palette: PaletteMode,
    /// Free-running force field tuning.
    pub force: ForceConfig,
    /// Timeline playback tuning.
    pub animation: AnimationConfig,
}

impl EngineConfig {
    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easing::Easing;

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "area": { "size": [1024.0, 768.0] },
            "palette": "Viridis",
            "animation": { "fps": 24.0, "looping": true, "easing": "Bounce" }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.area.size.x, 1024.0);
        assert_eq!(config.area.margin, Bounds::default().margin);
        assert_eq!(config.palette, PaletteMode::Viridis);
        assert_eq!(config.animation.fps, 24.0);
        assert!(config.animation.looping);
        assert_eq!(config.animation.easing, Easing::Bounce);
        assert_eq!(config.animation.transition_speed, 0.15);
        assert_eq!(config.force, ForceConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("genefield-config-{}.json", std::process::id()));
        let mut config = EngineConfig::default();
        config.force.seed = Some(99);
        config.animation.trail_capacity = 12;

        config.save(&path).unwrap();
        let loaded = EngineConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
