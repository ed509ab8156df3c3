//! Chunk construction and the background build pool.
//!
//! [`build_chunk`] turns a self-contained [`BuildRequest`] into unindexed
//! vertex arrays. [`BuildPool`] runs builds on worker threads that exchange
//! [`WorkerMessage`]s with the main thread.

mod builder;
mod error;
mod pool;
mod protocol;
mod request;
mod vertex;

pub use builder::build_chunk;
pub use error::{BuildPoolError, SubmitError};
pub use pool::{BuildPool, default_worker_count};
pub use protocol::WorkerMessage;
pub use request::{BuildRequest, BuildResult, TerrainParams};
pub use vertex::{TerrainVertex, vertex_bytes};
