use crate::{
    core::{decide_anonymous, Decision, DenyReason, Lookup, Runtime, Workload},
    DecisionMetrics,
};
use futures::future;
use hyper::{http, Request, Response};
use std::convert::Infallible;
use tokio::time;
use tracing::{debug, info, warn};

/// Answers whether a model may be called without credentials.
///
/// `GET /?ns=<namespace>&modelid=<name>` always responds `200 OK` with a JSON
/// body of the form `{"anonymous": <bool>}`. Callers must inspect the body:
/// every failure is reported as `{"anonymous": false}`.
#[derive(Clone)]
pub struct ModelCheck<L> {
    lookups: L,
    timeout: time::Duration,
    metrics: DecisionMetrics,
}

type Body = http_body_util::Full<bytes::Bytes>;

// === impl ModelCheck ===

impl<L> ModelCheck<L> {
    pub fn new(lookups: L, timeout: time::Duration, metrics: DecisionMetrics) -> Self {
        Self {
            lookups,
            timeout,
            metrics,
        }
    }
}

impl<L, B> tower::Service<Request<B>> for ModelCheck<L>
where
    L: Lookup<Workload> + Lookup<Runtime> + Clone + 'static,
    B: Send + 'static,
{
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Infallible>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        if req.method() != http::Method::GET || req.uri().path() != "/" {
            return Box::pin(future::ok(
                Response::builder()
                    .status(http::StatusCode::NOT_FOUND)
                    .body(Body::default())
                    .expect("not found response must be valid"),
            ));
        }

        let check = self.clone();
        Box::pin(async move {
            info!(uri = %req.uri(), "Received request");
            let query = req.uri().query();
            let ns = query_param(query, "ns");
            let model_id = query_param(query, "modelid");

            let decision = match time::timeout(
                check.timeout,
                decide_anonymous(&check.lookups, ns.as_deref(), model_id.as_deref()),
            )
            .await
            {
                Ok(decision) => decision,
                Err(_) => {
                    warn!(?ns, ?model_id, timeout = ?check.timeout, "Lookups timed out");
                    Decision::Denied(DenyReason::LookupTimeout)
                }
            };
            debug!(?ns, ?model_id, ?decision);
            check.metrics.observe(decision);

            Ok(json_response(decision.is_anonymous()))
        })
    }
}

/// Returns the first value of `key` in a URL query string.
fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

fn json_response(anonymous: bool) -> Response<Body> {
    Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!("{{\"anonymous\": {anonymous}}}\n")))
        .expect("model check response must be valid")
}
