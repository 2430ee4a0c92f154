use crate::{
    core::{Lookup, ObjectStore, ResourceId, Runtime, StoreError, Workload},
    k8s::{self, AuthConfig, InferenceService, ServingRuntime},
};

const FIELD_MANAGER: &str = "model-authz-controller";

/// Reads and writes resources through the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: k8s::Client,
}

impl KubeStore {
    pub fn new(client: k8s::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Lookup<AuthConfig> for KubeStore {
    async fn get(&self, id: &ResourceId) -> Result<Option<AuthConfig>, StoreError> {
        k8s::Api::<AuthConfig>::namespaced(self.client.clone(), &id.namespace)
            .get_opt(&id.name)
            .await
            .map_err(store_error)
    }
}

#[async_trait::async_trait]
impl ObjectStore<AuthConfig> for KubeStore {
    async fn replace(&self, id: &ResourceId, obj: AuthConfig) -> Result<AuthConfig, StoreError> {
        // The object carries the resource version it was read at, so the API
        // server rejects the write if it has changed since.
        let params = k8s::PostParams {
            field_manager: Some(FIELD_MANAGER.to_string()),
            ..Default::default()
        };
        k8s::Api::<AuthConfig>::namespaced(self.client.clone(), &id.namespace)
            .replace(&id.name, &params, &obj)
            .await
            .map_err(store_error)
    }
}

#[async_trait::async_trait]
impl Lookup<Workload> for KubeStore {
    async fn get(&self, id: &ResourceId) -> Result<Option<Workload>, StoreError> {
        let isvc = k8s::Api::<InferenceService>::namespaced(self.client.clone(), &id.namespace)
            .get_opt(&id.name)
            .await
            .map_err(store_error)?;
        Ok(isvc.as_ref().map(Workload::from))
    }
}

#[async_trait::async_trait]
impl Lookup<Runtime> for KubeStore {
    async fn get(&self, id: &ResourceId) -> Result<Option<Runtime>, StoreError> {
        let rt = k8s::Api::<ServingRuntime>::namespaced(self.client.clone(), &id.namespace)
            .get_opt(&id.name)
            .await
            .map_err(store_error)?;
        Ok(rt.as_ref().map(Runtime::from))
    }
}

fn store_error(error: k8s::Error) -> StoreError {
    match error {
        k8s::Error::Api(ref rsp) if rsp.code == 409 => StoreError::Conflict,
        error => StoreError::Api(error.into()),
    }
}
