//! Procedural terrain synthesis: multi-octave noise, bounded height, biome
//! classification, texture splatting, and vertex colouring.
//!
//! Every generator here is a pure function of its construction parameters
//! and the sample position, so workers and the main thread agree exactly.

mod biome;
mod colour;
mod height;
mod noise_gen;
mod splat;

pub use biome::{Biome, BiomeClassifier, DESERT_MAX_ELEVATION, FOREST_NOISE_BAND};
pub use colour::ColourGenerator;
pub use height::{HeightGenerator, HeightRange};
pub use noise_gen::{NoiseGenerator, NoiseParams, NoiseType};
pub use splat::{SplatMap, TextureKind, TextureSplatter, TextureWeight};
