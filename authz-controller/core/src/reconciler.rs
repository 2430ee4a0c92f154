use crate::{
    hosts::IdentityHosts, policy_key, Error, ExpandHosts, ObjectStore, PolicyHosts, PolicyStore,
    Workload,
};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Keeps a namespace's authorization policy in step with the public hosts of
/// the workloads it contains.
///
/// The reconciler holds no state of its own: every call reads the policy
/// fresh, so calls may be repeated and may interleave with calls for other
/// workloads.
#[derive(Clone, Debug)]
pub struct PolicyReconciler<P, S, E = IdentityHosts> {
    policies: PolicyStore<P, S, E>,
}

impl<P, S, E> PolicyReconciler<P, S, E>
where
    P: PolicyHosts + Send + 'static,
    S: ObjectStore<P>,
    E: ExpandHosts,
{
    pub fn new(policies: PolicyStore<P, S, E>) -> Self {
        Self { policies }
    }

    /// Protects the workload's public host.
    ///
    /// Workloads without a public host are not yet reachable and are skipped;
    /// they are reconciled again once their status changes.
    pub async fn reconcile(
        &self,
        workload: &Workload,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let Some(host) = workload.public_host.as_deref() else {
            debug!(id = %workload.id, "Workload has no public host yet");
            return Ok(());
        };

        let key = policy_key(&workload.id.namespace);
        self.policies.add_host(&key, host, cancel).await
    }

    /// Stops protecting the workload's public host.
    pub async fn remove(
        &self,
        workload: &Workload,
        cancel: &CancellationToken,
    ) -> Result<(), Error> {
        let host = workload.public_host.as_deref().unwrap_or_default();
        let key = policy_key(&workload.id.namespace);
        self.policies.remove_host(&key, host, cancel).await
    }
}
