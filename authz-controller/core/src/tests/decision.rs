use super::{init_tracing, FakeStore};
use crate::{decide_anonymous, Decision, DenyReason, ResourceId, Runtime, Workload};

fn mk_store(auth_enabled: bool) -> FakeStore {
    let store = FakeStore::default();
    store.insert_workload(Workload {
        id: ResourceId::new("teamA", "model1"),
        public_host: None,
        runtime: Some("r1".to_string()),
    });
    store.insert_runtime(Runtime {
        id: ResourceId::new("teamA", "r1"),
        auth_enabled,
    });
    store
}

#[tokio::test]
async fn runtime_without_auth_allows_anonymous() {
    let _tracing = init_tracing();
    let store = mk_store(false);
    let decision = decide_anonymous(&store, Some("teamA"), Some("model1")).await;
    assert_eq!(decision, Decision::Anonymous);
    assert!(decision.is_anonymous());
}

#[tokio::test]
async fn runtime_with_auth_denies_anonymous() {
    let _tracing = init_tracing();
    let store = mk_store(true);
    assert_eq!(
        decide_anonymous(&store, Some("teamA"), Some("model1")).await,
        Decision::Denied(DenyReason::AuthEnabled)
    );
}

#[tokio::test]
async fn missing_parameters_deny_anonymous() {
    let _tracing = init_tracing();
    let store = mk_store(false);
    for (ns, model, reason) in [
        (None, Some("model1"), DenyReason::MissingNamespace),
        (Some(""), Some("model1"), DenyReason::MissingNamespace),
        (Some("teamA"), None, DenyReason::MissingModelId),
        (Some("teamA"), Some(""), DenyReason::MissingModelId),
    ] {
        assert_eq!(
            decide_anonymous(&store, ns, model).await,
            Decision::Denied(reason),
            "ns={ns:?} modelid={model:?}"
        );
    }
}

#[tokio::test]
async fn unknown_workload_denies_anonymous() {
    let _tracing = init_tracing();
    let store = mk_store(false);
    assert_eq!(
        decide_anonymous(&store, Some("teamA"), Some("model2")).await,
        Decision::Denied(DenyReason::WorkloadNotFound)
    );
    assert_eq!(
        decide_anonymous(&store, Some("teamB"), Some("model1")).await,
        Decision::Denied(DenyReason::WorkloadNotFound)
    );
}

#[tokio::test]
async fn missing_runtime_reference_denies_anonymous() {
    let _tracing = init_tracing();
    let store = mk_store(false);
    for runtime in [None, Some(String::new())] {
        store.insert_workload(Workload {
            id: ResourceId::new("teamA", "model1"),
            public_host: None,
            runtime,
        });
        assert_eq!(
            decide_anonymous(&store, Some("teamA"), Some("model1")).await,
            Decision::Denied(DenyReason::MissingRuntime)
        );
    }
}

#[tokio::test]
async fn unknown_runtime_denies_anonymous() {
    let _tracing = init_tracing();
    let store = mk_store(false);
    store.insert_workload(Workload {
        id: ResourceId::new("teamA", "model1"),
        public_host: None,
        runtime: Some("r2".to_string()),
    });
    assert_eq!(
        decide_anonymous(&store, Some("teamA"), Some("model1")).await,
        Decision::Denied(DenyReason::RuntimeNotFound)
    );
}

#[tokio::test]
async fn lookup_failure_denies_anonymous() {
    let _tracing = init_tracing();
    let store = mk_store(false);
    store.fail_lookups();
    assert_eq!(
        decide_anonymous(&store, Some("teamA"), Some("model1")).await,
        Decision::Denied(DenyReason::WorkloadLookupFailed)
    );
}
