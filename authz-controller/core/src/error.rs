use crate::ResourceId;
use thiserror::Error;

/// Errors returned by an object store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object changed since it was read.
    #[error("resource version conflict")]
    Conflict,

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] anyhow::Error),
}

/// Errors returned when mutating an authorization policy.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to update {id}: {source}")]
    Store {
        id: ResourceId,
        #[source]
        source: StoreError,
    },

    #[error("failed to update {id}: still conflicting after {attempts} attempts")]
    ConflictRetriesExhausted { id: ResourceId, attempts: usize },

    #[error("operation cancelled")]
    Cancelled,
}

impl Error {
    pub(crate) fn store(id: &ResourceId, source: StoreError) -> Self {
        match source {
            StoreError::Cancelled => Self::Cancelled,
            source => Self::Store {
                id: id.clone(),
                source,
            },
        }
    }
}
