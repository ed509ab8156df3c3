//! Chunk construction: samples the terrain generators over a regular grid in
//! the face plane, projects onto the shape and emits unindexed triangles.

use glam::DVec3;
use strata_cubesphere::{Projected, ShapeProjector};
use strata_terrain::{ColourGenerator, HeightGenerator, SplatMap, TextureSplatter};

use crate::request::{BuildRequest, BuildResult};

/// One sampled grid point.
struct GridPoint {
    projected: Projected,
    /// Displaced world-space position.
    world: DVec3,
    /// Height after the shape's height mask.
    elevation: f64,
    uv: [f32; 2],
}

/// Build the mesh for one chunk.
///
/// Pure: identical requests produce identical results. A resolution of zero
/// is treated as one. If every triangle is culled the arrays are empty.
#[must_use]
pub fn build_chunk(request: &BuildRequest) -> BuildResult {
    let projector = request.shape.projector(request.radius);
    let heights = HeightGenerator::new(request.noise_params, request.height_range);
    let splatter = TextureSplatter::new(
        request.biome_params,
        request.colour_noise_params,
        request.height_range,
    );
    let colours = ColourGenerator::new(request.colour_noise_params, request.height_range);

    let res = request.resolution.max(1) as usize;
    let side = res + 1;
    let half = request.width * 0.5;
    let step = request.width / res as f64;

    let mut grid = Vec::with_capacity(side * side);
    for j in 0..side {
        for i in 0..side {
            let local = DVec3::new(
                request.offset.x - half + i as f64 * step,
                request.offset.y - half + j as f64 * step,
                request.offset.z,
            );
            let projected = projector.project(request.transform.apply(local));
            let height = heights.get(request.center + projected.position);
            grid.push(GridPoint {
                projected,
                world: request.center + projected.displaced(height),
                elevation: height * projected.height_mask,
                uv: [i as f32 / res as f32, j as f32 / res as f32],
            });
        }
    }

    let index = |i: usize, j: usize| j * side + i;
    let mut triangles: Vec<[usize; 3]> = Vec::with_capacity(res * res * 2);
    for j in 0..res {
        for i in 0..res {
            let a = index(i, j);
            let b = index(i + 1, j);
            let c = index(i + 1, j + 1);
            let d = index(i, j + 1);
            if projector.faces_inward() {
                triangles.push([a, c, b]);
                triangles.push([a, d, c]);
            } else {
                triangles.push([a, b, c]);
                triangles.push([a, c, d]);
            }
        }
    }

    // Area-weighted: the unnormalized cross product scales with triangle area.
    let mut normals = vec![DVec3::ZERO; grid.len()];
    for tri in &triangles {
        let [p0, p1, p2] = tri.map(|v| grid[v].world);
        let n = (p1 - p0).cross(p2 - p0);
        for &v in tri {
            normals[v] += n;
        }
    }
    for (n, point) in normals.iter_mut().zip(grid.iter()) {
        *n = n.normalize_or(point.projected.up);
    }

    triangles.retain(|tri| {
        let corners = tri.map(|v| grid[v].projected);
        !projector.culls_triangle(&corners)
    });

    if triangles.is_empty() {
        tracing::trace!(key = %request.key, "chunk fully culled");
        return BuildResult::empty(request.key);
    }

    let mut splats: Vec<Option<SplatMap>> = vec![None; grid.len()];
    let mut vertex_splat = |v: usize| -> SplatMap {
        *splats[v].get_or_insert_with(|| {
            let p = &grid[v];
            splatter.get_splat(p.world, normals[v], p.projected.up, p.elevation)
        })
    };

    let vertex_count = triangles.len() * 3;
    let mut result = BuildResult {
        key: request.key,
        positions: Vec::with_capacity(vertex_count * 3),
        normals: Vec::with_capacity(vertex_count * 3),
        colours: Vec::with_capacity(vertex_count * 3),
        uvs: Vec::with_capacity(vertex_count * 2),
        coords: Vec::with_capacity(vertex_count * 3),
        weights1: Vec::with_capacity(vertex_count * 4),
        weights2: Vec::with_capacity(vertex_count * 4),
    };

    for tri in &triangles {
        let mut combined = SplatMap::default();
        for &v in tri {
            combined.accumulate(&vertex_splat(v));
        }
        let top = combined.top4();

        for &v in tri {
            let p = &grid[v];
            let relative = p.world - request.origin;
            result.positions.extend(relative.as_vec3().to_array());
            result.normals.extend(normals[v].as_vec3().to_array());
            result.colours.extend(colours.get_colour(p.world, p.elevation));
            result.uvs.extend(p.uv);
            result.coords.extend(p.world.as_vec3().to_array());
            result.weights1.extend(top.map(|w| w.index as f32));
            result.weights2.extend(top.map(|w| w.strength));
        }
    }

    tracing::trace!(
        key = %request.key,
        triangles = triangles.len(),
        "chunk built"
    );
    result
}
