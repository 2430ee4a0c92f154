#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod decision;
mod error;
pub mod hosts;
mod policy;
mod reconciler;
mod resource_id;
pub mod store;


pub use self::{
    decision::{decide_anonymous, Decision, DenyReason, Runtime, Workload},
    error::{Error, StoreError},
    hosts::{ExpandHosts, IdentityHosts},
    policy::{PolicyStore, MAX_UPDATE_ATTEMPTS},
    reconciler::PolicyReconciler,
    resource_id::{policy_key, ResourceId},
    store::{Lookup, ObjectStore, PolicyHosts},
};
pub use tokio_util::sync::CancellationToken;

/// Suffix appended to a namespace's name to form the name of the
/// authorization policy that protects it.
pub const POLICY_NAME_SUFFIX: &str = "-protection";
