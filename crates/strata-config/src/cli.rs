//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{BuildMode, Config, ShapeKind};

/// Strata command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "strata", about = "Streaming planet and ringworld terrain")]
pub struct CliArgs {
    /// Body shape to generate.
    #[arg(long, value_enum)]
    pub shape: Option<ShapeKind>,

    /// World seed.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker thread count (0 builds chunks synchronously).
    #[arg(long)]
    pub workers: Option<u32>,

    /// Grid cells per chunk edge.
    #[arg(long)]
    pub resolution: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(shape) = args.shape {
            self.terrain.shape = shape;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = seed;
        }
        if let Some(workers) = args.workers {
            if workers == 0 {
                self.workers.mode = BuildMode::Synchronous;
            } else {
                self.workers.mode = BuildMode::Threaded;
                self.workers.worker_count = workers;
            }
        }
        if let Some(resolution) = args.resolution {
            self.terrain.qt_min_cell_resolution = resolution;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_args() -> CliArgs {
        CliArgs {
            shape: None,
            seed: None,
            workers: None,
            resolution: None,
            log_level: None,
            config: None,
            frames: None,
        }
    }

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            shape: Some(ShapeKind::Ring),
            seed: Some(77),
            ..empty_args()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.terrain.shape, ShapeKind::Ring);
        assert_eq!(config.terrain.seed, 77);
        // Non-overridden fields retain defaults
        assert_eq!(config.terrain.qt_min_cell_resolution, 32);
        assert_eq!(config.workers.mode, BuildMode::Threaded);
    }

    #[test]
    fn test_zero_workers_selects_synchronous_mode() {
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs {
            workers: Some(0),
            ..empty_args()
        });
        assert_eq!(config.workers.mode, BuildMode::Synchronous);

        config.apply_cli_overrides(&CliArgs {
            workers: Some(3),
            ..empty_args()
        });
        assert_eq!(config.workers.mode, BuildMode::Threaded);
        assert_eq!(config.workers.worker_count, 3);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&empty_args());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_from_command_line() {
        let args = CliArgs::parse_from(["strata", "--shape", "ring", "--frames", "120"]);
        assert_eq!(args.shape, Some(ShapeKind::Ring));
        assert_eq!(args.frames, Some(120));
    }
}
