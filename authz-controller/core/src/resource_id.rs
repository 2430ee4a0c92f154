use crate::POLICY_NAME_SUFFIX;
use std::fmt;

/// Identifies a namespaced resource.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct ResourceId {
    pub namespace: String,
    pub name: String,
}

impl ResourceId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Returns the key of the authorization policy shared by all workloads in
/// `namespace`.
pub fn policy_key(namespace: &str) -> ResourceId {
    ResourceId::new(namespace, format!("{namespace}{POLICY_NAME_SUFFIX}"))
}
