use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Failed to read snapshot file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("An error occurred during JSON deserialization of the snapshot: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{entity} with id {id} was not found in the snapshot.")]
    NotFound { entity: &'static str, id: i64 },
}
