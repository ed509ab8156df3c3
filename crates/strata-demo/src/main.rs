//! Headless terrain demo: flies a camera from orbit down to the surface and
//! logs chunk streaming statistics.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p strata-demo -- --shape ring --frames 600`.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use glam::{DVec3, Vec3};
use strata_config::{CliArgs, Config, ShapeKind};
use strata_planet::{TerrainChunkManager, shape_center, shape_radius};
use tracing::{error, info, warn};

const DEFAULT_FRAMES: u32 = 300;
const FRAME_TIME: f64 = 1.0 / 60.0;
/// Far plane handed to the log-depth encoding.
const FAR_PLANE: f32 = 1.0e8;

/// Camera position for `t` in `[0, 1]`: a descent from three radii out to
/// just above the surface, orbiting a quarter turn on the way.
fn descent(config: &Config, t: f64) -> DVec3 {
    let radius = shape_radius(&config.terrain);
    let center = shape_center(&config.terrain);
    let angle = t * std::f64::consts::FRAC_PI_2;
    let dir = DVec3::new(angle.sin(), 0.0, angle.cos());
    match config.terrain.shape {
        // Ring surfaces face inward; descend from the axis toward the band.
        ShapeKind::Ring => center + dir * radius * (0.2 + 0.79 * t),
        ShapeKind::Planet => {
            let altitude = radius * 2.0 * (1.0 - t) + config.terrain.noise_height * 2.0;
            center + dir * (radius + altitude)
        }
    }
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args
        .config
        .clone()
        .or_else(|| Config::default_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let mut manager = match TerrainChunkManager::new(&config) {
        Ok(manager) => manager,
        Err(e) => {
            error!("failed to start terrain: {e}");
            std::process::exit(1);
        }
    };
    manager.update_sun_direction(Vec3::new(1.0, 1.0, 0.5));

    // Wait for first paint before starting the descent.
    let start = descent(&config, 0.0);
    let started = Instant::now();
    while !manager.is_ready() {
        manager.update(FRAME_TIME, start);
        if started.elapsed() > Duration::from_secs(60) {
            warn!("terrain not ready after 60s; continuing");
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    info!(
        chunks = manager.chunk_count(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "initial terrain built"
    );

    let frames = args.frames.unwrap_or(DEFAULT_FRAMES).max(1);
    let mut totals = (0usize, 0usize, 0usize);
    for frame in 0..frames {
        let t = f64::from(frame) / f64::from(frames);
        let camera = descent(&config, t);
        manager.update(FRAME_TIME, camera);

        let stats = manager.stats();
        totals.0 += stats.created;
        totals.1 += stats.recycled;
        totals.2 += stats.discarded;
        if frame % 60 == 0 {
            let uniform = manager.uniform(FAR_PLANE);
            info!(
                frame,
                live = stats.live,
                pending = stats.pending,
                deferred = stats.deferred,
                scenery = manager.scenery().instance_count(),
                ocean = manager.ocean().patch_count(),
                time = uniform.time,
                "frame"
            );
        }
    }

    let vertices: usize = manager.chunks().map(|c| c.geometry.vertex_count()).sum();
    info!(
        created = totals.0,
        recycled = totals.1,
        discarded = totals.2,
        live = manager.chunk_count(),
        vertices,
        "descent finished"
    );
}
