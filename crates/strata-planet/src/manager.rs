//! Per-frame orchestration of the quadtree, chunk builds and chunk lifetimes.
//!
//! Each [`TerrainChunkManager::update`] queries the quadtree around the
//! camera, diffs the resulting leaf keys against the live chunks, recycles
//! chunks whose keys disappeared, and schedules builds for new keys. Builds
//! run on a [`BuildPool`] or, in synchronous mode, inline with a per-frame
//! cap. A result is only materialized if its key is still desired when it
//! arrives.

use glam::{DVec3, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};
use strata_config::{BuildMode, Config};
use strata_cubesphere::{ChunkKey, CubeFace, CubeQuadtree, QuadLeaf};
use strata_mesh::{
    BuildPool, BuildPoolError, BuildRequest, BuildResult, SubmitError, TerrainParams, build_chunk,
};
use tracing::{debug, info, warn};

use crate::camera::{LogDepth, TerrainUniform};
use crate::chunk::{ChunkGeometry, ChunkMesh, RenderGroup, TerrainChunk};
use crate::ocean::{Ocean, OceanParams};
use crate::params::{chunk_resolution, quadtree_params, terrain_params};
use crate::scenery::{Scenery, SceneryParams};

/// Counters for the most recent update, plus current totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Live chunks after the update.
    pub live: usize,
    /// Builds submitted but not yet received.
    pub pending: usize,
    /// Chunks materialized this update.
    pub created: usize,
    /// Chunks recycled this update.
    pub recycled: usize,
    /// Results dropped because their key was no longer wanted.
    pub discarded: usize,
    /// Missing chunks left for a later update.
    pub deferred: usize,
    /// Builds handed to the pool this update.
    pub submitted: usize,
    /// Pending builds cancelled this update.
    pub cancelled: usize,
}

/// Owns every terrain chunk of one body.
pub struct TerrainChunkManager {
    config: Config,
    params: TerrainParams,
    resolution: u32,
    quadtree: CubeQuadtree,
    chunks: FxHashMap<ChunkKey, TerrainChunk>,
    groups: Vec<RenderGroup>,
    desired: FxHashSet<ChunkKey>,
    /// Submitted builds, with the origin their positions are relative to.
    pending: FxHashMap<ChunkKey, DVec3>,
    pool: Option<BuildPool>,
    max_sync_builds: usize,
    ocean: Ocean,
    scenery: Scenery,
    sun_direction: Vec3,
    camera: DVec3,
    elapsed: f64,
    enabled: bool,
    ready: bool,
    stats: FrameStats,
}

fn make_pool(config: &Config) -> Result<Option<BuildPool>, BuildPoolError> {
    match config.workers.mode {
        BuildMode::Threaded => Ok(Some(BuildPool::new(
            config.workers.worker_count as usize,
            config.workers.max_in_flight as usize,
        )?)),
        BuildMode::Synchronous => Ok(None),
    }
}

impl TerrainChunkManager {
    /// Create a manager from configuration. Nothing is built until the
    /// first [`Self::update`].
    pub fn new(config: &Config) -> Result<Self, BuildPoolError> {
        let params = terrain_params(&config.terrain);
        let quadtree = CubeQuadtree::new(
            quadtree_params(&config.terrain),
            params.shape.projector(params.radius),
        );
        let pool = make_pool(config)?;
        let ocean_params = OceanParams {
            sea_level: config.ocean.sea_level,
            resolution: config.ocean.resolution,
            ..Default::default()
        };
        let scenery_params =
            SceneryParams::from_config(&config.scenery, config.terrain.seed, config.ocean.sea_level);

        info!(
            shape = ?config.terrain.shape,
            radius = params.radius,
            threaded = pool.is_some(),
            "terrain chunk manager created"
        );

        Ok(Self {
            resolution: chunk_resolution(&config.terrain),
            quadtree,
            chunks: FxHashMap::default(),
            groups: CubeFace::ALL.iter().map(|&f| RenderGroup::new(f)).collect(),
            desired: FxHashSet::default(),
            pending: FxHashMap::default(),
            pool,
            max_sync_builds: config.workers.max_sync_builds_per_frame.max(1) as usize,
            ocean: Ocean::new(ocean_params, &params, config.ocean.enabled),
            scenery: Scenery::new(scenery_params, &params, config.scenery.enabled),
            sun_direction: Vec3::Y,
            camera: DVec3::ZERO,
            elapsed: 0.0,
            enabled: true,
            ready: false,
            stats: FrameStats::default(),
            params,
            config: config.clone(),
        })
    }

    /// Advance one frame with the camera at world position `camera`.
    pub fn update(&mut self, dt: f64, camera: DVec3) {
        self.elapsed += dt.max(0.0);
        self.camera = camera;
        if !self.enabled {
            return;
        }
        let mut stats = FrameStats::default();

        self.quadtree.insert(camera - self.params.center);
        let mut leaves: Vec<QuadLeaf> = self
            .quadtree
            .children()
            .into_iter()
            .flat_map(|face| face.leaves)
            .collect();
        self.desired = leaves.iter().map(|leaf| leaf.key).collect();

        let stale: Vec<ChunkKey> = self
            .chunks
            .keys()
            .filter(|key| !self.desired.contains(key))
            .copied()
            .collect();
        for key in stale {
            self.recycle(&key);
            stats.recycled += 1;
        }

        if let Some(pool) = &self.pool {
            let desired = &self.desired;
            self.pending.retain(|key, _| {
                let keep = desired.contains(key);
                if !keep {
                    pool.cancel(key);
                    stats.cancelled += 1;
                }
                keep
            });
        }

        let arrived = self.pool.as_ref().map(BuildPool::drain_results).unwrap_or_default();
        for result in arrived {
            let origin = self.pending.remove(&result.key);
            match origin {
                Some(origin)
                    if self.desired.contains(&result.key)
                        && !self.chunks.contains_key(&result.key) =>
                {
                    self.materialize(result, origin);
                    stats.created += 1;
                }
                _ => {
                    debug!(key = %result.key, "discarding stale build");
                    stats.discarded += 1;
                }
            }
        }

        // Nearest first.
        leaves.retain(|leaf| {
            !self.chunks.contains_key(&leaf.key) && !self.pending.contains_key(&leaf.key)
        });
        leaves.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.key.cmp(&b.key)));

        match &self.pool {
            Some(pool) => {
                for (i, leaf) in leaves.iter().enumerate() {
                    let request = BuildRequest::for_key(leaf.key, self.resolution, &self.params);
                    let origin = request.origin;
                    match pool.submit(request) {
                        Ok(()) => {
                            self.pending.insert(leaf.key, origin);
                            stats.submitted += 1;
                        }
                        Err(SubmitError::Saturated { .. }) => {
                            stats.deferred += leaves.len() - i;
                            break;
                        }
                        Err(SubmitError::Disconnected) => {
                            warn!("build pool disconnected; deferring builds");
                            stats.deferred += leaves.len() - i;
                            break;
                        }
                    }
                }
            }
            None => {
                let budget = self.max_sync_builds.min(leaves.len());
                stats.deferred += leaves.len() - budget;
                for leaf in &leaves[..budget] {
                    let request = BuildRequest::for_key(leaf.key, self.resolution, &self.params);
                    let result = build_chunk(&request);
                    self.materialize(result, request.origin);
                    stats.created += 1;
                }
            }
        }

        for chunk in self.chunks.values_mut() {
            chunk.reposition(camera);
        }

        if !self.ready
            && self.pending.is_empty()
            && self.desired.iter().all(|key| self.chunks.contains_key(key))
        {
            self.ready = true;
            info!(chunks = self.chunks.len(), "terrain ready");
        }

        stats.live = self.chunks.len();
        stats.pending = self.pending.len();
        if stats.created + stats.recycled > 0 {
            debug!(
                created = stats.created,
                recycled = stats.recycled,
                pending = stats.pending,
                deferred = stats.deferred,
                "terrain chunks updated"
            );
        }
        self.stats = stats;
    }

    fn materialize(&mut self, result: BuildResult, origin: DVec3) {
        let key = result.key;
        let radius = self.params.radius;
        let mut chunk = TerrainChunk {
            key,
            transform: key.face.transform(),
            bounds: key.bounds(radius),
            size: key.size(radius),
            origin,
            mesh: ChunkMesh {
                render_offset: Vec3::ZERO,
                visible: true,
            },
            geometry: ChunkGeometry::from_result(&result),
        };
        chunk.reposition(self.camera);
        self.groups[key.face.index()].add(key);
        self.ocean.insert(&chunk);
        self.scenery.insert(key);
        self.chunks.insert(key, chunk);
    }

    fn recycle(&mut self, key: &ChunkKey) {
        if let Some(mut chunk) = self.chunks.remove(key) {
            self.groups[key.face.index()].remove(key);
            chunk.geometry.dispose();
            self.ocean.remove(key);
            self.scenery.remove(key);
            debug!(key = %key, "chunk recycled");
        }
    }

    /// Dispose every chunk and forget every pending build.
    fn clear(&mut self) {
        if let Some(pool) = &self.pool {
            pool.cancel_all();
            // Results already queued are stale.
            let _ = pool.drain_results();
        }
        self.pending.clear();
        let keys: Vec<ChunkKey> = self.chunks.keys().copied().collect();
        for key in keys {
            self.recycle(&key);
        }
        for group in &mut self.groups {
            group.clear();
        }
        self.ocean.clear();
        self.scenery.clear();
        self.desired.clear();
        self.ready = false;
    }

    /// Replace the configuration, discarding all terrain. The worker pool
    /// is rebuilt from the new settings.
    ///
    /// Queued builds are cancelled, but the old pool is joined before this
    /// returns, so the call blocks until builds already running on a worker
    /// finish (at most one chunk build per worker).
    pub fn reconfigure(&mut self, config: &Config) -> Result<(), BuildPoolError> {
        self.clear();
        let mut rebuilt = Self::new(config)?;
        rebuilt.sun_direction = self.sun_direction;
        rebuilt.camera = self.camera;
        rebuilt.elapsed = self.elapsed;
        rebuilt.set_enabled(self.enabled);
        *self = rebuilt;
        info!("terrain reconfigured");
        Ok(())
    }

    /// Live chunks.
    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values()
    }

    pub fn chunk(&self, key: &ChunkKey) -> Option<&TerrainChunk> {
        self.chunks.get(key)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Keys the most recent quadtree query asked for.
    pub fn desired(&self) -> &FxHashSet<ChunkKey> {
        &self.desired
    }

    pub fn is_pending(&self, key: &ChunkKey) -> bool {
        self.pending.contains_key(key)
    }

    /// Latched true once every desired chunk of some frame has been built.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn group(&self, face: CubeFace) -> &RenderGroup {
        &self.groups[face.index()]
    }

    pub fn groups(&self) -> &[RenderGroup] {
        &self.groups
    }

    pub fn update_sun_direction(&mut self, direction: Vec3) {
        self.sun_direction = direction.normalize_or(Vec3::Y);
    }

    pub fn sun_direction(&self) -> Vec3 {
        self.sun_direction
    }

    /// Show or hide the terrain. While disabled, updates leave chunks as they are.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        for group in &mut self.groups {
            group.visible = enabled;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ocean(&self) -> &Ocean {
        &self.ocean
    }

    pub fn ocean_mut(&mut self) -> &mut Ocean {
        &mut self.ocean
    }

    pub fn scenery(&self) -> &Scenery {
        &self.scenery
    }

    pub fn scenery_mut(&mut self) -> &mut Scenery {
        &mut self.scenery
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn quadtree(&self) -> &CubeQuadtree {
        &self.quadtree
    }

    /// Shader uniform for the current frame.
    pub fn uniform(&self, far: f32) -> TerrainUniform {
        TerrainUniform::new(
            self.camera,
            self.sun_direction,
            &LogDepth::new(far),
            self.elapsed as f32,
        )
    }
}
