//! Application configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`TSDF_SECTION__KEY`)
//!
//! The source directory given on the command line overrides all of these.

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::{Path, PathBuf};
use tsdf_core::{ByteOrder, ExtractionSettings, DEFAULT_DIMENSION, DEFAULT_EPSILON, DEFAULT_MAX_JUMP};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Extraction parameters
    #[serde(default)]
    pub extraction: ExtractionConfig,
    /// Volume file location and format
    #[serde(default)]
    pub input: InputConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl AppConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`TSDF_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // TSDF_EXTRACTION__STRIDE=2 -> extraction.stride = 2
        figment = figment.merge(Env::prefixed("TSDF_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Scalar value of the extracted surface
    pub isolevel: f32,
    /// Subsampling factor along every axis
    pub stride: usize,
    /// Samples along each axis of the volume
    pub dimension: usize,
    /// Largest corner-value difference an edge may span
    pub max_jump: f32,
    /// Tolerance for snapping to a corner
    pub epsilon: f32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            isolevel: 0.0,
            stride: 1,
            dimension: DEFAULT_DIMENSION,
            max_jump: DEFAULT_MAX_JUMP,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl ExtractionConfig {
    /// Convert to the engine's settings
    pub fn to_settings(&self) -> ExtractionSettings {
        ExtractionSettings::new()
            .with_dimension(self.dimension)
            .with_stride(self.stride)
            .with_isolevel(self.isolevel)
            .with_max_jump(self.max_jump)
            .with_epsilon(self.epsilon)
    }
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory containing the volume file
    pub source_directory: PathBuf,
    /// Volume file name inside `source_directory`
    pub file_name: String,
    /// Byte order of the scalars in the file
    pub byte_order: ByteOrder,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            source_directory: PathBuf::from("."),
            file_name: "tsdf.bin".to_string(),
            byte_order: ByteOrder::Native,
        }
    }
}

impl InputConfig {
    /// Full path of the volume file
    pub fn volume_path(&self) -> PathBuf {
        self.source_directory.join(&self.file_name)
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace); `RUST_LOG` takes precedence
    pub log_level: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.extraction.dimension, 512);
        assert_eq!(config.extraction.stride, 1);
        assert_eq!(config.extraction.max_jump, 0.8);
        assert_eq!(config.input.file_name, "tsdf.bin");
        assert_eq!(config.input.byte_order, ByteOrder::Native);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("isolevel"));
        assert!(toml.contains("source_directory"));
        assert!(toml.contains("byte_order = \"native\""));
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [extraction]
            stride = 4

            [input]
            byte_order = "big"
            "#,
        )
        .unwrap();
        assert_eq!(config.extraction.stride, 4);
        assert_eq!(config.extraction.dimension, 512);
        assert_eq!(config.input.byte_order, ByteOrder::Big);
        assert_eq!(config.input.file_name, "tsdf.bin");
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_to_settings() {
        let extraction = ExtractionConfig {
            isolevel: 0.1,
            stride: 2,
            dimension: 64,
            max_jump: 0.5,
            epsilon: 1e-4,
        };
        let settings = extraction.to_settings();
        assert_eq!(settings.dimension, 64);
        assert_eq!(settings.stride, 2);
        assert_eq!(settings.isolevel, 0.1);
        assert_eq!(settings.interpolation.max_jump, 0.5);
        assert_eq!(settings.interpolation.epsilon, 1e-4);
        assert!(settings.validate().is_empty());
    }

    #[test]
    fn test_volume_path() {
        let input = InputConfig {
            source_directory: PathBuf::from("/data/scans"),
            ..InputConfig::default()
        };
        assert_eq!(input.volume_path(), PathBuf::from("/data/scans/tsdf.bin"));
    }
}
