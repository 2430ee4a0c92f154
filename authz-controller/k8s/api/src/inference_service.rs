use kube::ResourceExt;
use model_authz_controller_core::{ResourceId, Workload};
use std::collections::BTreeMap;

/// A model deployment served by a ServingRuntime.
///
/// Only the fields consulted by the controller are typed.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    kube::CustomResource,
    serde::Deserialize,
    serde::Serialize,
    schemars::JsonSchema,
)]
#[kube(
    group = "serving.kserve.io",
    version = "v1beta1",
    kind = "InferenceService",
    status = "InferenceServiceStatus",
    namespaced
)]
pub struct InferenceServiceSpec {
    #[serde(default)]
    pub predictor: PredictorSpec,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct PredictorSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelSpec>,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct ModelSpec {
    /// The name of the ServingRuntime that serves this model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

#[derive(
    Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize, schemars::JsonSchema,
)]
pub struct InferenceServiceStatus {
    /// The externally reachable URL, once the service is ready.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl InferenceService {
    /// Returns the host (and port, if one is given) of the status URL.
    ///
    /// The authority is returned as written: its case is kept, as is a port
    /// that matches the scheme's default.
    pub fn public_host(&self) -> Option<String> {
        let raw = self.status.as_ref()?.url.as_deref()?;
        let url = url::Url::parse(raw).ok()?;
        url.host_str()?;

        let (_, rest) = raw.split_once("://")?;
        let authority = rest
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();
        let host = authority
            .rsplit_once('@')
            .map_or(authority, |(_, host)| host);
        if host.is_empty() {
            return None;
        }
        Some(host.to_string())
    }

    pub fn runtime(&self) -> Option<&str> {
        self.spec.predictor.model.as_ref()?.runtime.as_deref()
    }
}

impl From<&InferenceService> for Workload {
    fn from(isvc: &InferenceService) -> Self {
        Workload {
            id: ResourceId::new(isvc.namespace().unwrap_or_default(), isvc.name_any()),
            public_host: isvc.public_host(),
            runtime: isvc.runtime().map(Into::into),
        }
    }
}
