use crate::{
    controller::{self, Context},
    ControllerMetrics, DecisionMetrics, KubeStore, ModelCheck,
};
use anyhow::{bail, Result};
use clap::Parser;
use prometheus_client::registry::Registry;
use std::sync::Arc;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info_span, Instrument};

#[derive(Debug, Parser)]
#[clap(
    name = "model-authz",
    about = "Keeps model serving authorization policies in sync"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "model_authz=info,warn",
        env = "MODEL_AUTHZ_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    server: kubert::ServerArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Disables the model check server.
    #[clap(long)]
    model_check_disabled: bool,

    /// Bounds the lookups made to answer a single model check.
    #[clap(long, default_value = "5000")]
    lookup_timeout_ms: u64,

    /// Bounds the policy updates made by a single reconciliation.
    #[clap(long, default_value = "10000")]
    reconcile_timeout_ms: u64,

    #[clap(long, default_value = "10")]
    requeue_delay_secs: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            admin,
            client,
            log_level,
            log_format,
            server,
            model_check_disabled,
            lookup_timeout_ms,
            reconcile_timeout_ms,
            requeue_delay_secs,
        } = self;

        let server = if model_check_disabled {
            None
        } else {
            Some(server)
        };

        let mut prom = <Registry>::default();
        let controller_metrics =
            ControllerMetrics::register(prom.sub_registry_with_prefix("policy"));
        let decision_metrics =
            DecisionMetrics::register(prom.sub_registry_with_prefix("model_check"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .with_optional_server(server)
            .build()
            .await?;

        // Spawn the InferenceService controller, which keeps each namespace's
        // AuthConfig hosts in sync with its models.
        let ctx = Arc::new(Context::new(
            runtime.client(),
            Duration::from_millis(reconcile_timeout_ms),
            Duration::from_secs(requeue_delay_secs),
            CancellationToken::new(),
            controller_metrics,
        ));
        tokio::spawn(
            controller::run(ctx, runtime.shutdown_handle())
                .instrument(info_span!("inferenceservices")),
        );

        let store = KubeStore::new(runtime.client());
        let lookup_timeout = Duration::from_millis(lookup_timeout_ms);
        let runtime = runtime.spawn_server(move || {
            ModelCheck::new(store.clone(), lookup_timeout, decision_metrics.clone())
        });

        // Block the main thread on the shutdown signal. Once it fires, wait for
        // the background tasks to complete before exiting.
        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
