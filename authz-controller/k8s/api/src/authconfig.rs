use model_authz_controller_core::PolicyHosts;
use std::collections::BTreeMap;

/// An Authorino policy protecting a set of hosts.
///
/// Only `hosts` is interpreted; every other field is carried through
/// unchanged so that replacing the resource does not drop configuration owned
/// by others.
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
    group = "authorino.kuadrant.io",
    version = "v1beta1",
    kind = "AuthConfig",
    namespaced
)]
pub struct AuthConfigSpec {
    /// The hosts whose requests are subject to this policy.
    #[serde(default)]
    pub hosts: Vec<String>,

    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl PolicyHosts for AuthConfig {
    fn hosts(&self) -> &[String] {
        &self.spec.hosts
    }

    fn set_hosts(&mut self, hosts: Vec<String>) {
        self.spec.hosts = hosts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_unknown_fields() {
        let json = serde_json::json!({
            "apiVersion": "authorino.kuadrant.io/v1beta1",
            "kind": "AuthConfig",
            "metadata": {
                "name": "ns-0-protection",
                "namespace": "ns-0",
                "resourceVersion": "7",
            },
            "spec": {
                "hosts": ["a.example.com"],
                "identity": [{"name": "kubernetes-users", "kubernetes": {"audiences": ["https://kubernetes.default.svc"]}}],
            },
        });

        let mut policy: AuthConfig = serde_json::from_value(json).expect("must parse");
        assert_eq!(policy.hosts(), ["a.example.com".to_string()]);

        policy.set_hosts(vec!["a.example.com".into(), "b.example.com".into()]);
        let out = serde_json::to_value(&policy).expect("must serialize");
        assert_eq!(
            out["spec"]["hosts"],
            serde_json::json!(["a.example.com", "b.example.com"])
        );
        assert_eq!(
            out["spec"]["identity"][0]["name"],
            serde_json::json!("kubernetes-users")
        );
        assert_eq!(out["metadata"]["resourceVersion"], serde_json::json!("7"));
    }

    #[test]
    fn missing_hosts_default_to_empty() {
        let spec: AuthConfigSpec =
            serde_json::from_value(serde_json::json!({})).expect("must parse");
        assert!(spec.hosts.is_empty());
    }
}
