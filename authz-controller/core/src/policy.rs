use crate::{
    hosts::{dedup, ExpandHosts, IdentityHosts},
    Error, ObjectStore, PolicyHosts, ResourceId, StoreError,
};
use std::{future::Future, marker::PhantomData};
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// The number of times a conflicting write is attempted before giving up.
pub const MAX_UPDATE_ATTEMPTS: usize = 5;

const CONFLICT_BACKOFF: time::Duration = time::Duration::from_millis(25);

/// Adds and removes hosts on authorization policies of type `P`.
///
/// Policies are shared by every workload in a namespace, so all writes are
/// conditional on the version that was read. A conflicting write is retried
/// from a fresh read.
#[derive(Debug)]
pub struct PolicyStore<P, S, E = IdentityHosts> {
    store: S,
    expand: E,
    _policy: PhantomData<fn() -> P>,
}

// === impl PolicyStore ===

impl<P, S> PolicyStore<P, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            expand: IdentityHosts,
            _policy: PhantomData,
        }
    }
}

impl<P, S, E> PolicyStore<P, S, E> {
    /// Replaces the host expansion strategy.
    pub fn with_expansion<F: ExpandHosts>(self, expand: F) -> PolicyStore<P, S, F> {
        PolicyStore {
            store: self.store,
            expand,
            _policy: PhantomData,
        }
    }
}

impl<P, S, E> PolicyStore<P, S, E>
where
    P: PolicyHosts + Send + 'static,
    S: ObjectStore<P>,
    E: ExpandHosts,
{
    /// Ensures `host` is protected by the policy at `id`.
    ///
    /// A missing policy means protection is not provisioned for the namespace
    /// and is not an error.
    pub async fn add_host(
        &self,
        id: &ResourceId,
        host: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let added = self.expand.expand(host);
        self.update(id, cancel, |hosts| {
            let mut hosts = dedup(hosts);
            for host in &added {
                if !hosts.contains(host) {
                    hosts.push(host.clone());
                }
            }
            hosts
        })
        .await
    }

    /// Ensures `host` is no longer protected by the policy at `id`.
    pub async fn remove_host(
        &self,
        id: &ResourceId,
        host: &str,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let removed = self.expand.expand(host);
        self.update(id, cancel, |hosts| {
            let mut hosts = dedup(hosts);
            hosts.retain(|h| !removed.contains(h));
            hosts
        })
        .await
    }

    async fn update<F>(
        &self,
        id: &ResourceId,
        cancel: &CancellationToken,
        f: F,
    ) -> Result<(), Error>
    where
        F: Fn(&[String]) -> Vec<String> + Sync,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;

            let mut policy = match cancelable(cancel, self.store.get(id)).await {
                Ok(Some(policy)) => policy,
                Ok(None) => {
                    debug!(%id, "Policy not found");
                    return Ok(());
                }
                Err(error) => return Err(Error::store(id, error)),
            };

            let hosts = f(policy.hosts());
            if hosts == policy.hosts() {
                trace!(%id, "Hosts unchanged");
                return Ok(());
            }
            policy.set_hosts(hosts);

            match cancelable(cancel, self.store.replace(id, policy)).await {
                Ok(_) => {
                    debug!(%id, attempts, "Updated policy hosts");
                    return Ok(());
                }
                Err(StoreError::Conflict) if attempts < MAX_UPDATE_ATTEMPTS => {
                    debug!(%id, attempts, "Policy changed concurrently; retrying");
                    let backoff = CONFLICT_BACKOFF * attempts as u32;
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = time::sleep(backoff) => {}
                    }
                }
                Err(StoreError::Conflict) => {
                    return Err(Error::ConflictRetriesExhausted {
                        id: id.clone(),
                        attempts,
                    });
                }
                Err(error) => return Err(Error::store(id, error)),
            }
        }
    }
}

impl<P, S: Clone, E: Clone> Clone for PolicyStore<P, S, E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            expand: self.expand.clone(),
            _policy: PhantomData,
        }
    }
}

/// Drives `fut` unless `cancel` fires first.
async fn cancelable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        res = fut => res,
    }
}
