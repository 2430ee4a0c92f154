//! Capabilities required of the external object store.
//!
//! Implementations are expected to be cheap to share: the policy store and
//! the decision path only ever hold a reference.

use crate::{ResourceId, StoreError};

/// Reads an object by key.
#[async_trait::async_trait]
pub trait Lookup<T>: Send + Sync {
    /// Returns `Ok(None)` when no object exists at `id`.
    async fn get(&self, id: &ResourceId) -> Result<Option<T>, StoreError>;
}

/// Reads and conditionally replaces an object by key.
#[async_trait::async_trait]
pub trait ObjectStore<T>: Lookup<T> {
    /// Replaces the object at `id` with `obj`.
    ///
    /// The write must only succeed if the stored object has not changed since
    /// `obj` was read; otherwise [`StoreError::Conflict`] is returned.
    async fn replace(&self, id: &ResourceId, obj: T) -> Result<T, StoreError>;
}

/// An object carrying a list of protected hosts.
pub trait PolicyHosts {
    fn hosts(&self) -> &[String];

    fn set_hosts(&mut self, hosts: Vec<String>);
}
