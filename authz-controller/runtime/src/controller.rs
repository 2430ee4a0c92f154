//! Drives the policy reconciler from InferenceService watches.
//!
//! Each InferenceService carries a finalizer so that its host is removed from
//! the namespace's policy before the resource goes away.

use crate::{
    core::{self, PolicyReconciler, PolicyStore, Workload},
    k8s::{self, AuthConfig, InferenceService, ResourceExt},
    ControllerMetrics, KubeStore,
};
use futures::prelude::*;
use kube::runtime::{
    controller::{Action, Controller},
    finalizer::{self, finalizer},
    watcher,
};
use std::{future::Future, sync::Arc};
use thiserror::Error;
use tokio::{sync::oneshot, time};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

pub const FINALIZER: &str = "serving.opendatahub.io/finalizer";

/// Limits the amount of time a watch can be idle before being reset.
///
/// Must be less than 295 or Kubernetes throws an error.
const WATCH_TIMEOUT_SECS: u32 = 290;

pub struct Context {
    client: k8s::Client,
    reconciler: PolicyReconciler<AuthConfig, KubeStore>,
    timeout: time::Duration,
    requeue: time::Duration,
    shutdown: CancellationToken,
    metrics: ControllerMetrics,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Policy(#[from] core::Error),

    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(time::Duration),
}

// === impl Context ===

impl Context {
    pub fn new(
        client: k8s::Client,
        timeout: time::Duration,
        requeue: time::Duration,
        shutdown: CancellationToken,
        metrics: ControllerMetrics,
    ) -> Self {
        let store = KubeStore::new(client.clone());
        Self {
            client,
            reconciler: PolicyReconciler::new(PolicyStore::new(store)),
            timeout,
            requeue,
            shutdown,
            metrics,
        }
    }

    async fn apply(&self, isvc: &InferenceService) -> Result<Action, Error> {
        let workload = Workload::from(isvc);
        let res = self
            .bounded(self.reconciler.reconcile(&workload, &self.shutdown))
            .await;
        self.metrics.observe("apply", &res);
        res?;

        // Status changes trigger a new reconciliation.
        Ok(Action::await_change())
    }

    async fn cleanup(&self, isvc: &InferenceService) -> Result<Action, Error> {
        let workload = Workload::from(isvc);
        let res = self
            .bounded(self.reconciler.remove(&workload, &self.shutdown))
            .await;
        self.metrics.observe("cleanup", &res);
        res?;

        info!(id = %workload.id, "Removed InferenceService from policy");
        Ok(Action::await_change())
    }

    /// Drops `op` if it does not complete within the reconcile deadline.
    async fn bounded<F>(&self, op: F) -> Result<(), Error>
    where
        F: Future<Output = Result<(), core::Error>>,
    {
        match time::timeout(self.timeout, op).await {
            Ok(res) => res.map_err(Into::into),
            Err(_) => Err(Error::DeadlineExceeded(self.timeout)),
        }
    }
}

/// Runs the InferenceService controller until shutdown is signaled.
pub async fn run(ctx: Arc<Context>, drain: kubert::shutdown::Watch) {
    let isvcs = k8s::Api::<InferenceService>::all(ctx.client.clone());
    let shutdown = ctx.shutdown.clone();

    let (close_tx, close_rx) = oneshot::channel::<()>();
    let controller = Controller::new(
        isvcs,
        watcher::Config::default().timeout(WATCH_TIMEOUT_SECS),
    )
    .graceful_shutdown_on(close_rx.map(|_| ()))
    .run(reconcile, error_policy, ctx)
    .for_each(|res| async move {
        match res {
            Ok((obj, _)) => debug!(namespace = ?obj.namespace, name = %obj.name, "Reconciled"),
            Err(error) => warn!(%error, "Reconciliation failed"),
        }
    });
    tokio::pin!(controller);

    info!("InferenceService controller running");
    tokio::select! {
        () = &mut controller => {}
        handle = drain.signaled() => {
            // Abort in-flight store calls rather than waiting on them.
            shutdown.cancel();
            let _ = close_tx.send(());
            handle.release_after(controller).await;
        }
    }
}

async fn reconcile(
    isvc: Arc<InferenceService>,
    ctx: Arc<Context>,
) -> Result<Action, finalizer::Error<Error>> {
    let namespace = isvc.namespace().unwrap_or_default();
    let name = isvc.name_any();
    let api = k8s::Api::<InferenceService>::namespaced(ctx.client.clone(), &namespace);

    finalizer(&api, FINALIZER, isvc, |event| async move {
        match event {
            finalizer::Event::Apply(isvc) => ctx.apply(&isvc).await,
            finalizer::Event::Cleanup(isvc) => ctx.cleanup(&isvc).await,
        }
    })
    .instrument(info_span!("reconcile", %namespace, %name))
    .await
}

fn error_policy(
    isvc: Arc<InferenceService>,
    error: &finalizer::Error<Error>,
    ctx: Arc<Context>,
) -> Action {
    warn!(
        namespace = ?isvc.namespace(),
        name = %isvc.name_any(),
        %error,
        "Failed to reconcile InferenceService"
    );
    Action::requeue(ctx.requeue)
}
