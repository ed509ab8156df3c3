//! Configuration system for strata terrain.
//!
//! Provides the terrain tunables as an explicit immutable struct that persists
//! to disk as RON. Supports CLI overrides via clap, hot-reload detection, and
//! forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BuildMode, Config, DebugConfig, OceanConfig, SceneryConfig, ShapeKind, TerrainConfig,
    WorkerConfig,
};
pub use error::ConfigError;
