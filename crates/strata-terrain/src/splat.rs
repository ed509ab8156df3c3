//! Per-point texture weighting ("splatting").
//!
//! Every surface point gets a weight for each of the [`TextureKind`]s. Slope,
//! normalized elevation, biome and a secondary colour-noise field all
//! contribute. The mesh builder sums the maps of a triangle's three vertices
//! and keeps the four strongest layers for the shader.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::biome::{Biome, BiomeClassifier};
use crate::height::HeightRange;
use crate::noise_gen::{NoiseGenerator, NoiseParams, NoiseType};

/// Terrain texture layers, in texture-array order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureKind {
    /// Base layer; also the fallback when nothing else applies.
    Dirt,
    /// Flat lowland in forest biomes, sparser in arid ones.
    Grass,
    /// Flat lowland in arid and desert biomes.
    Gravel,
    /// Steep lowland slopes.
    Rock,
    /// Flat ground at alpine elevations.
    Snow,
    /// Steep slopes at alpine elevations.
    SnowRock,
    /// Flat lowland in arid biomes where the colour noise is low.
    Cobble,
    /// Flat lowland in desert biomes.
    SandyRock,
}

impl TextureKind {
    /// Number of texture layers.
    pub const COUNT: usize = 8;

    /// Every layer, in index order.
    pub const ALL: [TextureKind; Self::COUNT] = [
        TextureKind::Dirt,
        TextureKind::Grass,
        TextureKind::Gravel,
        TextureKind::Rock,
        TextureKind::Snow,
        TextureKind::SnowRock,
        TextureKind::Cobble,
        TextureKind::SandyRock,
    ];

    /// Layer index in the texture array.
    #[must_use]
    pub fn index(self) -> u32 {
        self as u32
    }

    /// The layer at a texture-array index, if any.
    #[must_use]
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }
}

/// A texture layer and how strongly it contributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextureWeight {
    /// Layer index in the texture array.
    pub index: u32,
    /// Non-negative contribution of the layer.
    pub strength: f32,
}

/// Weight of every texture layer at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplatMap {
    weights: [TextureWeight; TextureKind::COUNT],
}

impl Default for SplatMap {
    fn default() -> Self {
        let mut weights = [TextureWeight::default(); TextureKind::COUNT];
        for kind in TextureKind::ALL {
            weights[kind as usize].index = kind.index();
        }
        Self { weights }
    }
}

impl SplatMap {
    /// Weight of one layer.
    #[must_use]
    pub fn get(&self, kind: TextureKind) -> TextureWeight {
        self.weights[kind as usize]
    }

    /// Set one layer's strength; negative values become zero.
    pub fn set(&mut self, kind: TextureKind, strength: f32) {
        self.weights[kind as usize].strength = strength.max(0.0);
    }

    /// Add `other`'s strengths to this map.
    pub fn accumulate(&mut self, other: &SplatMap) {
        for (mine, theirs) in self.weights.iter_mut().zip(other.weights.iter()) {
            mine.strength += theirs.strength;
        }
    }

    /// Every layer with its weight, in index order.
    pub fn iter(&self) -> impl Iterator<Item = (TextureKind, TextureWeight)> + '_ {
        TextureKind::ALL.iter().map(|&k| (k, self.weights[k as usize]))
    }

    /// Sum of all strengths.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.weights.iter().map(|w| w.strength).sum()
    }

    /// The four strongest layers, renormalized to sum to 1.
    ///
    /// Equal strengths are ordered by ascending texture index. An all-zero map
    /// yields full dirt.
    #[must_use]
    pub fn top4(&self) -> [TextureWeight; 4] {
        let mut sorted = self.weights;
        sorted.sort_by(|a, b| {
            b.strength
                .total_cmp(&a.strength)
                .then_with(|| a.index.cmp(&b.index))
        });
        let mut top = [sorted[0], sorted[1], sorted[2], sorted[3]];
        let sum: f32 = top.iter().map(|w| w.strength).sum();
        if sum > 0.0 {
            for w in &mut top {
                w.strength /= sum;
            }
        } else {
            top = [
                TextureWeight {
                    index: TextureKind::Dirt.index(),
                    strength: 1.0,
                },
                sorted[1],
                sorted[2],
                sorted[3],
            ];
            for w in &mut top[1..] {
                w.strength = 0.0;
            }
        }
        top
    }
}

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Computes texture weights and biomes for surface points.
#[derive(Clone, Debug)]
pub struct TextureSplatter {
    biomes: BiomeClassifier,
    colour_noise: NoiseGenerator,
    range: HeightRange,
}

impl TextureSplatter {
    /// Noise parameters for the secondary colour-variation field.
    #[must_use]
    pub fn default_colour_params(seed: u64) -> NoiseParams {
        NoiseParams {
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
            exponentiation: 1.0,
            height: 1.0,
            scale: 600.0,
            seed: seed.wrapping_add(0xC010_0125),
            noise_type: NoiseType::Simplex,
        }
    }

    #[must_use]
    pub fn new(biome_params: NoiseParams, colour_params: NoiseParams, range: HeightRange) -> Self {
        Self {
            biomes: BiomeClassifier::new(biome_params),
            colour_noise: NoiseGenerator::new(colour_params),
            range,
        }
    }

    #[must_use]
    pub fn biome(&self, position: DVec3, elevation: f64) -> Biome {
        self.biomes.classify(position, elevation)
    }

    fn colour_variation(&self, position: DVec3) -> f64 {
        let height = self.colour_noise.params().height;
        if height <= 0.0 {
            return 0.5;
        }
        (self.colour_noise.get_vec(position) / height).clamp(0.0, 1.0)
    }

    /// Texture weights at a surface point.
    ///
    /// `normal` is the surface normal, `up` the shape's local vertical and
    /// `elevation` the height above the undisplaced surface.
    #[must_use]
    pub fn get_splat(&self, position: DVec3, normal: DVec3, up: DVec3, elevation: f64) -> SplatMap {
        let slope = 1.0 - normal.normalize_or_zero().dot(up.normalize_or_zero()).clamp(0.0, 1.0);
        let e = self.range.normalize(elevation);
        let n = self.colour_variation(position);
        let biome = self.biome(position, elevation);

        let steep = smoothstep(0.15, 0.45, slope);
        let flat = 1.0 - steep;
        let alpine = smoothstep(0.7, 0.85, e);
        let lowland = 1.0 - alpine;

        let mut map = SplatMap::default();
        map.set(TextureKind::Dirt, (0.05 + 0.3 * (1.0 - n) * flat * lowland) as f32);
        map.set(TextureKind::Rock, (steep * lowland) as f32);
        map.set(TextureKind::Snow, (alpine * flat) as f32);
        map.set(TextureKind::SnowRock, (alpine * steep) as f32);

        match biome {
            Biome::Desert => {
                map.set(TextureKind::SandyRock, (flat * lowland * (0.6 + 0.4 * n)) as f32);
                map.set(TextureKind::Gravel, (flat * lowland * 0.2 * (1.0 - n)) as f32);
            }
            Biome::Forest => {
                map.set(TextureKind::Grass, (flat * lowland * (0.5 + 0.5 * n)) as f32);
            }
            Biome::Arid => {
                map.set(TextureKind::Gravel, (flat * lowland * 0.5 * n) as f32);
                map.set(TextureKind::Cobble, (flat * lowland * 0.4 * (1.0 - n)) as f32);
                map.set(TextureKind::Grass, (flat * lowland * 0.2 * n) as f32);
            }
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn splatter() -> TextureSplatter {
        TextureSplatter::new(
            BiomeClassifier::default_params(5),
            TextureSplatter::default_colour_params(5),
            HeightRange::new(0.0, 1_500.0),
        )
    }

    #[test]
    fn test_texture_indices_are_distinct_and_ordered() {
        for (i, kind) in TextureKind::ALL.iter().enumerate() {
            assert_eq!(kind.index() as usize, i);
            assert_eq!(TextureKind::from_index(i as u32), Some(*kind));
        }
        assert_eq!(TextureKind::from_index(8), None);
    }

    #[test]
    fn test_steep_slope_prefers_rock() {
        let s = splatter();
        let p = DVec3::new(100.0, 40_000.0, 250.0);
        let map = s.get_splat(p, DVec3::X, DVec3::Y, 600.0);
        let top = map.top4();
        assert!(
            top[0].index == TextureKind::Rock.index() || top[0].index == TextureKind::SnowRock.index(),
            "steep ground dominated by {:?}",
            TextureKind::from_index(top[0].index)
        );
    }

    #[test]
    fn test_high_flat_ground_prefers_snow() {
        let s = splatter();
        let p = DVec3::new(-800.0, 41_400.0, 3.0);
        let map = s.get_splat(p, DVec3::Y, DVec3::Y, 1_450.0);
        assert_eq!(map.top4()[0].index, TextureKind::Snow.index());
    }

    #[test]
    fn test_low_ground_is_sandy() {
        let s = splatter();
        let p = DVec3::new(5.0, 40_010.0, 9.0);
        let map = s.get_splat(p, DVec3::Y, DVec3::Y, 10.0);
        assert_eq!(s.biome(p, 10.0), Biome::Desert);
        assert!(map.get(TextureKind::SandyRock).strength > 0.0);
        assert_eq!(map.get(TextureKind::Snow).strength, 0.0);
    }

    #[test]
    fn test_top4_sums_to_one() {
        let s = splatter();
        for i in 0..200 {
            let p = DVec3::new(i as f64 * 113.0, 40_000.0, i as f64 * 7.0);
            let normal = DVec3::new((i as f64 * 0.1).sin(), 1.0, 0.0).normalize();
            let top = s.get_splat(p, normal, DVec3::Y, i as f64 * 7.0).top4();
            let sum: f32 = top.iter().map(|w| w.strength).sum();
            assert!((sum - 1.0).abs() < 1e-5, "top4 sum {sum} at sample {i}");
        }
    }

    #[test]
    fn test_top4_tie_break_by_index() {
        let mut map = SplatMap::default();
        map.set(TextureKind::SandyRock, 1.0);
        map.set(TextureKind::Grass, 1.0);
        map.set(TextureKind::Rock, 1.0);
        map.set(TextureKind::Dirt, 1.0);
        map.set(TextureKind::Snow, 1.0);
        let top = map.top4();
        let indices: Vec<u32> = top.iter().map(|w| w.index).collect();
        assert_eq!(indices, vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_top4_of_empty_map_is_dirt() {
        let top = SplatMap::default().top4();
        assert_eq!(top[0].index, TextureKind::Dirt.index());
        assert_eq!(top[0].strength, 1.0);
        assert!(top[1..].iter().all(|w| w.strength == 0.0));
    }

    #[test]
    fn test_accumulate_adds_strengths() {
        let mut a = SplatMap::default();
        a.set(TextureKind::Rock, 0.5);
        let mut b = SplatMap::default();
        b.set(TextureKind::Rock, 0.25);
        b.set(TextureKind::Grass, 1.0);
        a.accumulate(&b);
        assert_eq!(a.get(TextureKind::Rock).strength, 0.75);
        assert_eq!(a.get(TextureKind::Grass).strength, 1.0);
        assert_eq!(a.total(), 1.75);
    }
}
