//! Subcommand handlers for run, formats and config actions.

use std::path::Path;

use super::args::{ConfigAction, RunArgs};
use crate::config::{default_path as get_config_path, Config, ConfigError, DEFAULT_CONFIG};
use crate::frame::PixelFormat;
use crate::output::{OutputError, RawWriter};
use crate::pipeline::{setup_ctrlc_handler, Pipeline, PipelineError, RunStats};
use crate::source::{FrameSource, RawFileSource, SourceError, TestPattern};

/// Errors reported by subcommands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("Config file already exists: {0}")]
    ConfigExists(String),

    #[error("Failed to write config file: {0}")]
    WriteConfig(std::io::Error),
}

/// Apply `run` flags on top of the loaded configuration.
pub fn apply_run_args(mut config: Config, args: &RunArgs) -> Config {
    if let Some(columns) = args.columns {
        config.mosaic.columns = columns;
    }
    if let Some(rows) = args.rows {
        config.mosaic.rows = rows;
    }
    if let Some(width) = args.width {
        config.source.width = width;
    }
    if let Some(height) = args.height {
        config.source.height = height;
    }
    if let Some(format) = args.format {
        config.source.format = format.into();
    }
    if let Some(frames) = args.frames {
        config.source.frames = Some(frames);
    }
    if let Some(input) = &args.input {
        config.source.input_dir = Some(input.clone());
    }
    if let Some(output) = &args.output {
        config.output.dir = output.clone();
    }
    if let Some(strip_tiles) = args.strip_tiles {
        config.output.strip_tiles = strip_tiles;
    }
    config.output.vertical |= args.vertical;
    config.output.horizontal |= args.horizontal;
    config.output.pairs |= args.pairs;
    if args.no_mosaic {
        config.output.mosaic = false;
    }
    config
}

/// Build the frame source described by the configuration.
pub fn open_source(config: &Config) -> Result<Box<dyn FrameSource>, SourceError> {
    let source = &config.source;
    match &source.input_dir {
        Some(dir) => Ok(Box::new(RawFileSource::open(
            dir,
            source.format,
            source.width,
            source.height,
        )?)),
        None => {
            let frames = source.frames.filter(|&n| n > 0);
            Ok(Box::new(TestPattern::new(
                source.format,
                source.width,
                source.height,
                frames,
            )?))
        }
    }
}

/// Run the stitching pipeline and print a summary.
pub fn run(config_path: Option<&Path>, args: &RunArgs) -> Result<RunStats, CliError> {
    let config = apply_run_args(Config::load(config_path)?, args);
    let mut source = open_source(&config)?;
    let writer = RawWriter::new(&config.output.dir)?;
    let mut pipeline = Pipeline::new(config.pipeline_settings(), writer)?;

    if let Err(e) = setup_ctrlc_handler() {
        log::warn!("Failed to install Ctrl+C handler: {}", e);
    }

    let stats = pipeline.run(source.as_mut())?;

    println!(
        "Processed {} frame(s): {} mosaic(s), {} pair(s), {} strip(s), {} skipped",
        stats.frames, stats.mosaics, stats.pairs, stats.strips, stats.skipped
    );
    for written in pipeline.written() {
        println!(
            "  {}  {}x{}  {}",
            written.path.display(),
            written.width,
            written.height,
            written.digest
        );
    }
    Ok(stats)
}

/// Print supported pixel formats to stdout.
pub fn list_formats() {
    println!("Supported pixel formats:");
    for format in PixelFormat::ALL {
        let note = if format.is_packed() {
            "  (packed: vertical only)"
        } else {
            ""
        };
        println!("  {:<14} {:>2} bits{}", format.to_string(), format.bits_per_pixel(), note);
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    action: ConfigAction,
    config_path: Option<&Path>,
) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(get_config_path);

    match action {
        ConfigAction::Show => {
            let config = Config::load(Some(&path))?;
            println!("Current configuration:");
            println!();
            print!("{}", config.to_toml()?);
            println!();
            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
        }
        ConfigAction::Init => {
            if path.exists() {
                return Err(CliError::ConfigExists(path.display().to_string()));
            }

            // Create parent directories if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(CliError::WriteConfig)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG).map_err(CliError::WriteConfig)?;

            println!("Created config file: {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::FormatArg;

    #[test]
    fn test_apply_run_args_overrides() {
        let args = RunArgs {
            columns: Some(5),
            format: Some(FormatArg::Bgra8),
            frames: Some(0),
            pairs: true,
            no_mosaic: true,
            ..RunArgs::default()
        };
        let config = apply_run_args(Config::default(), &args);
        assert_eq!(config.mosaic.columns, 5);
        assert_eq!(config.mosaic.rows, 3);
        assert_eq!(config.source.format, PixelFormat::Bgra8);
        assert_eq!(config.source.frames, Some(0));
        assert!(config.output.pairs);
        assert!(!config.output.mosaic);
    }

    #[test]
    fn test_apply_run_args_keeps_config_flags() {
        let mut config = Config::default();
        config.output.vertical = true;
        let config = apply_run_args(config, &RunArgs::default());
        assert!(config.output.vertical);
        assert!(config.output.mosaic);
    }

    #[test]
    fn test_open_source_rejects_undefined_format() {
        let mut config = Config::default();
        config.source.format = PixelFormat::Undefined;
        assert!(matches!(
            open_source(&config),
            Err(SourceError::UndefinedFormat)
        ));
    }

    #[test]
    fn test_config_init_then_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        handle_config_action(ConfigAction::Init, Some(&path)).unwrap();
        assert!(path.exists());

        let result = handle_config_action(ConfigAction::Init, Some(&path));
        assert!(matches!(result, Err(CliError::ConfigExists(_))));
    }

    #[test]
    fn test_run_writes_mosaic() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("missing.toml");
        let args = RunArgs {
            columns: Some(2),
            rows: Some(1),
            width: Some(4),
            height: Some(2),
            frames: Some(4),
            output: Some(dir.path().join("out")),
            ..RunArgs::default()
        };

        let stats = run(Some(&config_path), &args).unwrap();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.mosaics, 2);
        let files = std::fs::read_dir(dir.path().join("out")).unwrap().count();
        assert_eq!(files, 2);
    }
}
