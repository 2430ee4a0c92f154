//! Decides whether a model may be reached without credentials.
//!
//! Every lookup failure resolves to [`Decision::Denied`]: anonymous access is
//! only granted when the model's serving runtime is known and does not ask for
//! authentication.

use crate::{Lookup, ResourceId};
use tracing::{debug, info, warn};

/// A read-only view of an inference workload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Workload {
    pub id: ResourceId,

    /// The externally reachable host, once the workload is ready.
    pub public_host: Option<String>,

    /// The name of the serving runtime in the workload's namespace.
    pub runtime: Option<String>,
}

/// A read-only view of a serving runtime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Runtime {
    pub id: ResourceId,
    pub auth_enabled: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Anonymous,
    Denied(DenyReason),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DenyReason {
    MissingNamespace,
    MissingModelId,
    WorkloadNotFound,
    WorkloadLookupFailed,
    MissingRuntime,
    RuntimeNotFound,
    RuntimeLookupFailed,
    /// The lookups did not complete in time.
    LookupTimeout,
    AuthEnabled,
}

// === impl Decision ===

impl Decision {
    #[inline]
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

// === impl DenyReason ===

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingNamespace => "missing_namespace",
            Self::MissingModelId => "missing_model_id",
            Self::WorkloadNotFound => "workload_not_found",
            Self::WorkloadLookupFailed => "workload_lookup_failed",
            Self::MissingRuntime => "missing_runtime",
            Self::RuntimeNotFound => "runtime_not_found",
            Self::RuntimeLookupFailed => "runtime_lookup_failed",
            Self::LookupTimeout => "lookup_timeout",
            Self::AuthEnabled => "auth_enabled",
        }
    }
}

pub async fn decide_anonymous<L>(
    lookups: &L,
    namespace: Option<&str>,
    model_id: Option<&str>,
) -> Decision
where
    L: Lookup<Workload> + Lookup<Runtime>,
{
    let Some(namespace) = namespace.filter(|ns| !ns.is_empty()) else {
        warn!("Missing namespace");
        return Decision::Denied(DenyReason::MissingNamespace);
    };
    let Some(model_id) = model_id.filter(|id| !id.is_empty()) else {
        warn!(%namespace, "Missing model id");
        return Decision::Denied(DenyReason::MissingModelId);
    };

    let id = ResourceId::new(namespace, model_id);
    let workload = match Lookup::<Workload>::get(lookups, &id).await {
        Ok(Some(workload)) => workload,
        Ok(None) => {
            info!(%id, "Workload not found");
            return Decision::Denied(DenyReason::WorkloadNotFound);
        }
        Err(error) => {
            warn!(%id, %error, "Failed to get workload");
            return Decision::Denied(DenyReason::WorkloadLookupFailed);
        }
    };

    let Some(runtime) = workload.runtime.filter(|rt| !rt.is_empty()) else {
        warn!(%id, "Workload does not reference a serving runtime");
        return Decision::Denied(DenyReason::MissingRuntime);
    };

    let runtime_id = ResourceId::new(namespace, runtime);
    let runtime = match Lookup::<Runtime>::get(lookups, &runtime_id).await {
        Ok(Some(runtime)) => runtime,
        Ok(None) => {
            info!(%id, runtime = %runtime_id, "Serving runtime not found");
            return Decision::Denied(DenyReason::RuntimeNotFound);
        }
        Err(error) => {
            warn!(%id, runtime = %runtime_id, %error, "Failed to get serving runtime");
            return Decision::Denied(DenyReason::RuntimeLookupFailed);
        }
    };

    if runtime.auth_enabled {
        debug!(%id, runtime = %runtime_id, "Serving runtime requires authentication");
        return Decision::Denied(DenyReason::AuthEnabled);
    }

    Decision::Anonymous
}
