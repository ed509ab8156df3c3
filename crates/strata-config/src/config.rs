//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level terrain configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Body shape, quadtree and noise tunables.
    pub terrain: TerrainConfig,
    /// Chunk build scheduling.
    pub workers: WorkerConfig,
    /// Ocean collaborator settings.
    pub ocean: OceanConfig,
    /// Scenery collaborator settings.
    pub scenery: SceneryConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Which body the terrain is wrapped around.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum ShapeKind {
    /// Origin-centered sphere.
    #[default]
    Planet,
    /// Band on the inside of a ring around an offset center.
    Ring,
}

/// Global terrain tunables, read once when a manager is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Body shape.
    pub shape: ShapeKind,
    /// World seed shared by every noise field.
    pub seed: u64,
    /// Quadtree nodes at or below this edge length never subdivide (meters).
    pub qt_min_cell_size: f64,
    /// Grid cells per chunk edge.
    pub qt_min_cell_resolution: u32,
    /// Planet radius in meters.
    pub planet_radius: f64,
    /// Ring major radius in meters.
    pub ring_major_radius: f64,
    /// World-space center of the ring.
    pub ring_offset: [f64; 3],
    /// Latitude (radians) below which ring terrain keeps full height.
    pub ring_latitude_cutoff: f64,
    /// Latitude band (radians) over which ring terrain fades to flat.
    pub ring_latitude_fade: f64,
    /// Exponent shaping the fade curve.
    pub ring_drop_exponent: f64,
    /// Triangles beyond this latitude (radians) are not emitted.
    pub ring_cull_latitude: f64,
    /// Maximum terrain height in meters.
    pub noise_height: f64,
    /// Horizontal feature size of the height noise in meters.
    pub noise_scale: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            shape: ShapeKind::Planet,
            seed: 1,
            qt_min_cell_size: 500.0,
            qt_min_cell_resolution: 32,
            planet_radius: 40_000.0,
            ring_major_radius: 120_000.0,
            ring_offset: [0.0, 0.0, 0.0],
            ring_latitude_cutoff: 0.02,
            ring_latitude_fade: 0.05,
            ring_drop_exponent: 1.5,
            ring_cull_latitude: 0.1,
            noise_height: 1_500.0,
            noise_scale: 4_000.0,
        }
    }
}

/// How chunk builds are scheduled.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum BuildMode {
    /// Background worker threads.
    #[default]
    Threaded,
    /// Inline on the calling thread, throttled per frame.
    Synchronous,
}

/// Chunk build scheduling configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorkerConfig {
    /// Threaded or synchronous builds.
    pub mode: BuildMode,
    /// Number of worker threads (0 = derive from CPU count).
    pub worker_count: u32,
    /// Maximum builds queued or running at once.
    pub max_in_flight: u32,
    /// Maximum inline builds per update in synchronous mode.
    pub max_sync_builds_per_frame: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::Threaded,
            worker_count: 0,
            max_in_flight: 64,
            max_sync_builds_per_frame: 4,
        }
    }
}

/// Ocean configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OceanConfig {
    /// Build water patches alongside terrain chunks.
    pub enabled: bool,
    /// Sea level above the base radius in meters.
    pub sea_level: f64,
    /// Grid cells per water patch edge.
    pub resolution: u32,
}

impl Default for OceanConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sea_level: 120.0,
            resolution: 8,
        }
    }
}

/// Scenery placement configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneryConfig {
    /// Place scenery on close chunks.
    pub enabled: bool,
    /// Edge length of one placement cell in meters.
    pub cell_size: f64,
    /// Only chunks at most this large receive scenery.
    pub max_node_size: f64,
    /// Probability that a cell holds any instance.
    pub density: f64,
    /// Relative weight of trees.
    pub tree_ratio: f64,
    /// Relative weight of rocks.
    pub rock_ratio: f64,
    /// Relative weight of bushes.
    pub bush_ratio: f64,
}

impl Default for SceneryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cell_size: 40.0,
            max_node_size: 1_000.0,
            density: 0.35,
            tree_ratio: 0.5,
            rock_ratio: 0.2,
            bush_ratio: 0.3,
        }
    }
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs to the log directory in debug builds.
    pub file_logging: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            file_logging: true,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Platform config directory for strata (`<config_dir>/strata`).
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("strata"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    ///
    /// A changed config is meant to be handed to the terrain manager's
    /// `reconfigure`, which rebuilds every chunk.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
