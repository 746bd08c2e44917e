//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::FormatArg;

/// Stitch raw camera frames into strips, side-by-side pairs and grid mosaics
#[derive(Parser, Debug)]
#[command(name = "frame-stitch")]
#[command(version, about = "Stitch raw frames into strips and mosaics", long_about = None)]
#[command(after_help = "EXAMPLES:
    # 3x3 mosaics from 27 synthetic 640x480 Mono8 frames
    frame-stitch run

    # 4x2 mosaics of RGB8 frames replayed from a directory
    frame-stitch run --input frames/ --format rgb8 --width 320 --height 240 -C 4 -R 2

    # Left/right pairs only, until Ctrl+C
    frame-stitch run --pairs --no-mosaic --frames 0")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the stitching pipeline (default)
    Run(RunArgs),
    /// List supported pixel formats
    Formats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

/// Options for `run`; each overrides the matching config value.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Mosaic columns
    #[arg(long, short = 'C')]
    pub columns: Option<u32>,

    /// Mosaic rows
    #[arg(long, short = 'R')]
    pub rows: Option<u32>,

    /// Frame width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Frame height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Frame pixel format
    #[arg(long, short)]
    pub format: Option<FormatArg>,

    /// Test-pattern frames to generate (0 = until Ctrl+C)
    #[arg(long, short = 'n')]
    pub frames: Option<u64>,

    /// Replay *.raw frames from this directory instead of the test pattern
    #[arg(long, short)]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also write tall strips
    #[arg(long)]
    pub vertical: bool,

    /// Also write wide strips
    #[arg(long)]
    pub horizontal: bool,

    /// Also stitch consecutive frames side by side
    #[arg(long)]
    pub pairs: bool,

    /// Disable mosaic output
    #[arg(long)]
    pub no_mosaic: bool,

    /// Tiles per strip before it is written
    #[arg(long)]
    pub strip_tiles: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["frame-stitch"]);
        assert!(args.command.is_none());
        assert!(args.config.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_run_defaults() {
        let args = Args::parse_from(["frame-stitch", "run"]);
        match args.command {
            Some(Command::Run(run)) => {
                assert!(run.columns.is_none());
                assert!(run.format.is_none());
                assert!(!run.vertical);
                assert!(!run.no_mosaic);
            }
            _ => panic!("Expected Run subcommand"),
        }
    }

    #[test]
    fn test_args_run_options() {
        let args = Args::parse_from([
            "frame-stitch",
            "run",
            "-C",
            "4",
            "-R",
            "2",
            "--format",
            "rgb8",
            "--width",
            "320",
            "--height",
            "240",
            "--input",
            "/tmp/frames",
            "--pairs",
            "--no-mosaic",
        ]);
        let Some(Command::Run(run)) = args.command else {
            panic!("Expected Run subcommand");
        };
        assert_eq!(run.columns, Some(4));
        assert_eq!(run.rows, Some(2));
        assert_eq!(run.format, Some(FormatArg::Rgb8));
        assert_eq!(run.width, Some(320));
        assert_eq!(run.height, Some(240));
        assert_eq!(run.input, Some(PathBuf::from("/tmp/frames")));
        assert!(run.pairs);
        assert!(run.no_mosaic);
    }

    #[test]
    fn test_args_global_config_after_subcommand() {
        let args = Args::parse_from(["frame-stitch", "run", "--config", "/tmp/test.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_args_formats_subcommand() {
        let args = Args::parse_from(["frame-stitch", "formats"]);
        assert!(matches!(args.command, Some(Command::Formats)));
    }

    #[test]
    fn test_args_config_init_subcommand() {
        let args = Args::parse_from(["frame-stitch", "config", "init"]);
        match args.command {
            Some(Command::Config {
                action: ConfigAction::Init,
            }) => (),
            _ => panic!("Expected Config Init subcommand"),
        }
    }

    #[test]
    fn test_args_invalid_format_rejected() {
        let result = Args::try_parse_from(["frame-stitch", "run", "--format", "jpeg"]);
        assert!(result.is_err());
    }
}
