use crate::{ENABLE_AUTH_ANNOTATION, ENABLE_AUTH_VALUE};
use kube::ResourceExt;
use model_authz_controller_core::{ResourceId, Runtime};
use std::collections::BTreeMap;

/// A model server template referenced by InferenceServices.
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
    version = "v1alpha1",
    kind = "ServingRuntime",
    namespaced
)]
pub struct ServingRuntimeSpec {
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl ServingRuntime {
    pub fn auth_enabled(&self) -> bool {
        self.annotations()
            .get(ENABLE_AUTH_ANNOTATION)
            .is_some_and(|v| v == ENABLE_AUTH_VALUE)
    }
}

impl From<&ServingRuntime> for Runtime {
    fn from(rt: &ServingRuntime) -> Self {
        Runtime {
            id: ResourceId::new(rt.namespace().unwrap_or_default(), rt.name_any()),
            auth_enabled: rt.auth_enabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;

    fn mk_runtime(annotations: Option<BTreeMap<String, String>>) -> ServingRuntime {
        let mut rt = ServingRuntime::new("rt-0", Default::default());
        rt.metadata.namespace = Some("ns-0".to_string());
        rt.metadata.annotations = annotations;
        rt
    }

    #[test]
    fn auth_annotation() {
        for (annotations, enabled) in [
            (None, false),
            (Some(btreemap! {}), false),
            (Some(btreemap! { "enable-auth".to_string() => "true".to_string() }), true),
            (Some(btreemap! { "enable-auth".to_string() => "True".to_string() }), false),
            (Some(btreemap! { "enable-auth".to_string() => "false".to_string() }), false),
            (Some(btreemap! { "enable-auth".to_string() => "".to_string() }), false),
        ] {
            let rt = mk_runtime(annotations.clone());
            assert_eq!(rt.auth_enabled(), enabled, "{annotations:?}");
            assert_eq!(
                Runtime::from(&rt),
                Runtime {
                    id: ResourceId::new("ns-0", "rt-0"),
                    auth_enabled: enabled,
                }
            );
        }
    }
}
