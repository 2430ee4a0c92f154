use crate::{
    controller,
    core::{self, Decision},
};
use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug, Default)]
pub struct ControllerMetrics {
    reconciles: Family<ReconcileLabels, Counter>,
}

#[derive(Clone, Debug, Default)]
pub struct DecisionMetrics {
    decisions: Family<DecisionLabels, Counter>,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct ReconcileLabels {
    op: &'static str,
    result: &'static str,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct DecisionLabels {
    anonymous: &'static str,
    reason: &'static str,
}

// === ControllerMetrics ===

impl ControllerMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let reconciles = Family::<ReconcileLabels, Counter>::default();
        reg.register(
            "reconciles",
            "Total number of authorization policy reconciliations",
            reconciles.clone(),
        );
        Self { reconciles }
    }

    pub(crate) fn observe(&self, op: &'static str, result: &Result<(), controller::Error>) {
        use controller::Error::{DeadlineExceeded, Policy};
        let result = match result {
            Ok(()) => "ok",
            Err(Policy(core::Error::ConflictRetriesExhausted { .. })) => "conflict",
            Err(Policy(core::Error::Cancelled)) | Err(DeadlineExceeded(_)) => "cancelled",
            Err(Policy(core::Error::Store { .. })) => "error",
        };
        self.reconciles
            .get_or_create(&ReconcileLabels { op, result })
            .inc();
    }
}

// === DecisionMetrics ===

impl DecisionMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let decisions = Family::<DecisionLabels, Counter>::default();
        reg.register(
            "decisions",
            "Total number of anonymous access decisions",
            decisions.clone(),
        );
        Self { decisions }
    }

    pub(crate) fn observe(&self, decision: Decision) {
        let labels = match decision {
            Decision::Anonymous => DecisionLabels {
                anonymous: "true",
                reason: "",
            },
            Decision::Denied(reason) => DecisionLabels {
                anonymous: "false",
                reason: reason.as_str(),
            },
        };
        self.decisions.get_or_create(&labels).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DenyReason, ResourceId};
    use prometheus_client::encoding::text::encode;
    use tokio::time::Duration;

    fn encoded(prom: &Registry) -> String {
        let mut out = String::new();
        encode(&mut out, prom).expect("metrics must encode");
        out
    }

    #[test]
    fn reconcile_results() {
        let mut prom = <Registry>::default();
        let metrics = ControllerMetrics::register(prom.sub_registry_with_prefix("policy"));

        metrics.observe("apply", &Ok(()));
        metrics.observe("apply", &Ok(()));
        metrics.observe(
            "apply",
            &Err(controller::Error::Policy(
                core::Error::ConflictRetriesExhausted {
                    id: ResourceId::new("ns-0", "ns-0-protection"),
                    attempts: 5,
                },
            )),
        );
        metrics.observe(
            "cleanup",
            &Err(controller::Error::DeadlineExceeded(Duration::from_secs(10))),
        );
        metrics.observe("cleanup", &Err(core::Error::Cancelled.into()));

        let out = encoded(&prom);
        assert!(
            out.contains(r#"policy_reconciles_total{op="apply",result="ok"} 2"#),
            "{out}"
        );
        assert!(
            out.contains(r#"policy_reconciles_total{op="apply",result="conflict"} 1"#),
            "{out}"
        );
        assert!(
            out.contains(r#"policy_reconciles_total{op="cleanup",result="cancelled"} 2"#),
            "{out}"
        );
    }

    #[test]
    fn decision_reasons() {
        let mut prom = <Registry>::default();
        let metrics = DecisionMetrics::register(prom.sub_registry_with_prefix("model_check"));

        metrics.observe(Decision::Anonymous);
        metrics.observe(Decision::Denied(DenyReason::AuthEnabled));
        metrics.observe(Decision::Denied(DenyReason::AuthEnabled));
        metrics.observe(Decision::Denied(DenyReason::LookupTimeout));

        let out = encoded(&prom);
        assert!(
            out.contains(r#"model_check_decisions_total{anonymous="true",reason=""} 1"#),
            "{out}"
        );
        assert!(
            out.contains(
                r#"model_check_decisions_total{anonymous="false",reason="auth_enabled"} 2"#
            ),
            "{out}"
        );
        assert!(
            out.contains(
                r#"model_check_decisions_total{anonymous="false",reason="lookup_timeout"} 1"#
            ),
            "{out}"
        );
    }
}
