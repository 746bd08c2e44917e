//! Configuration file handling for frame-stitch.
//!
//! Loads configuration from `<config dir>/frame-stitch/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::frame::PixelFormat;
use crate::pipeline::{Outputs, PipelineSettings};

/// Configuration file structure for frame-stitch.
/// Loaded from the user config directory (or custom path via --config).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub mosaic: MosaicConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    /// Images per mosaic row
    pub columns: u32,
    /// Rows per mosaic
    pub rows: u32,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self { columns: 3, rows: 3 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Frames to synthesize when no input directory is given (0 = until Ctrl+C)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<u64>,
    /// Directory of raw frames to replay instead of the test pattern
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            format: PixelFormat::Mono8,
            frames: Some(27),
            input_dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub mosaic: bool,
    pub vertical: bool,
    pub horizontal: bool,
    pub pairs: bool,
    /// Tiles per strip before it is written and restarted
    pub strip_tiles: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("stitched"),
            mosaic: true,
            vertical: false,
            horizontal: false,
            pairs: false,
            strip_tiles: 16,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Pipeline settings described by this configuration.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            columns: self.mosaic.columns,
            rows: self.mosaic.rows,
            outputs: Outputs {
                mosaic: self.output.mosaic,
                vertical: self.output.vertical,
                horizontal: self.output.horizontal,
                pairs: self.output.pairs,
            },
            strip_tiles: self.output.strip_tiles.max(1),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("frame-stitch").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/frame-stitch/config.toml")
        })
}

/// Commented default config written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# frame-stitch configuration

[mosaic]
# Images per row
columns = 3
# Rows per mosaic
rows = 3

[source]
# Frame size and pixel format (mono8, mono16, rgb8, bgra8, bayer_rg8, ...)
width = 640
height = 480
format = "mono8"
# Number of test-pattern frames to generate (0 = until Ctrl+C)
frames = 27
# Replay *.raw files from a directory instead of the test pattern
# input_dir = "frames"

[output]
dir = "stitched"
mosaic = true
# Tall and wide strips, flushed every strip_tiles frames
vertical = false
horizontal = false
strip_tiles = 16
# Stitch consecutive frames side by side (left/right camera pairs)
pairs = false
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/frame-stitch.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mosaic]\ncolumns = 4").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.mosaic.columns, 4);
        assert_eq!(config.mosaic.rows, 3);
        assert_eq!(config.source.format, PixelFormat::Mono8);
        assert!(config.output.mosaic);
    }

    #[test]
    fn test_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[mosaic\ncolumns = ").unwrap();

        let result = Config::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
        let message = format!("{}", result.unwrap_err());
        assert!(message.starts_with("Failed to parse config file"));
    }

    #[test]
    fn test_default_config_text_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_format_names() {
        let config: Config = toml::from_str("[source]\nformat = \"bayer_rg8\"").unwrap();
        assert_eq!(config.source.format, PixelFormat::BayerRg8);
    }

    #[test]
    fn test_pipeline_settings() {
        let mut config = Config::default();
        config.output.pairs = true;
        config.output.strip_tiles = 0;
        let settings = config.pipeline_settings();
        assert_eq!(settings.columns, 3);
        assert!(settings.outputs.pairs);
        assert_eq!(settings.strip_tiles, 1);
    }
}
