use thiserror::Error;

/// Errors creating a [`crate::BuildPool`].
#[derive(Debug, Error)]
pub enum BuildPoolError {
    #[error("failed to spawn build worker {index}: {source}")]
    Spawn {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Why a build could not be queued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("build pool saturated ({in_flight} builds in flight)")]
    Saturated { in_flight: usize },
    #[error("build pool has shut down")]
    Disconnected,
}
