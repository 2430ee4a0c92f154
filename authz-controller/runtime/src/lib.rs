#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use model_authz_controller_core as core;
pub use model_authz_controller_k8s_api as k8s;

mod args;
pub mod controller;
mod metrics;
mod model_check;
mod store;

pub use self::{
    args::Args,
    metrics::{ControllerMetrics, DecisionMetrics},
    model_check::ModelCheck,
    store::KubeStore,
};
