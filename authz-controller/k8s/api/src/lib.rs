#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod authconfig;
pub mod inference_service;
pub mod serving_runtime;

pub use self::{
    authconfig::{AuthConfig, AuthConfigSpec},
    inference_service::{InferenceService, InferenceServiceSpec, InferenceServiceStatus},
    serving_runtime::{ServingRuntime, ServingRuntimeSpec},
};
pub use kube::{
    api::{Api, PostParams, ResourceExt},
    Client, Error,
};

/// Annotation set on a ServingRuntime by its creator to require that requests
/// to its models be authenticated. Only the value `"true"` enables it.
pub const ENABLE_AUTH_ANNOTATION: &str = "enable-auth";

/// Value of [`ENABLE_AUTH_ANNOTATION`] that enables authentication.
pub const ENABLE_AUTH_VALUE: &str = "true";
