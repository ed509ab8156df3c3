//! Messages exchanged with build workers.
//!
//! Serialized form:
//! `{"subject":"build_chunk","params":{..}}` for requests and
//! `{"subject":"build_chunk_result","data":{..}}` for responses.

use serde::{Deserialize, Serialize};

use crate::builder::build_chunk;
use crate::request::{BuildRequest, BuildResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "subject", rename_all = "snake_case")]
pub enum WorkerMessage {
    BuildChunk { params: Box<BuildRequest> },
    BuildChunkResult { data: Box<BuildResult> },
}

impl WorkerMessage {
    #[must_use]
    pub fn build(request: BuildRequest) -> Self {
        WorkerMessage::BuildChunk {
            params: Box::new(request),
        }
    }

    /// Handle a message on a worker.
    ///
    /// Requests yield a result message; anything else yields `None`.
    #[must_use]
    pub fn handle(&self) -> Option<WorkerMessage> {
        match self {
            WorkerMessage::BuildChunk { params } => Some(WorkerMessage::BuildChunkResult {
                data: Box::new(build_chunk(params)),
            }),
            WorkerMessage::BuildChunkResult { .. } => {
                tracing::warn!("worker received a result message; ignoring");
                None
            }
        }
    }

    /// The result payload, if this is a result message.
    #[must_use]
    pub fn into_result(self) -> Option<BuildResult> {
        match self {
            WorkerMessage::BuildChunkResult { data } => Some(*data),
            WorkerMessage::BuildChunk { .. } => None,
        }
    }
}
