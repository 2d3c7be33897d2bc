//! the inbound webhook surface of the relay
//!
//! One axum listener carrying the kuma webhook, the liveness probe and the
//! prometheus text endpoint. Each request is handled independently, the only
//! shared resource is the read-only [State] behind an [Arc].

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{ContentLengthLimit, Extension},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::{json, Value};

use crate::{
    alert::{AlertPayload, NormalizedAlert},
    alert_renderer::render_message,
    chatwork::{ChatworkClient, ForwardError},
    settings::Settings,
    telemetry_endpoint::{self, RelayMetrics},
};

/// inbound header carrying the shared secret
const SECRET_HEADER: &str = "X-Adapter-Secret";

/// upper bound for inbound payload bodies in bytes, enforced from the
/// Content-Length header before the body is buffered
const MAX_PAYLOAD_LEN: u64 = 1024 * 1024;

/// read-only per-process state handed to every request
pub struct State {
    pub settings: Settings,
    chatwork: ChatworkClient,
}

impl State {
    pub fn new(settings: Settings) -> Result<Self> {
        let chatwork = ChatworkClient::new(&settings)?;

        Ok(Self {
            settings,
            chatwork,
        })
    }
}

/// liveness probe, no configuration involved, no side effects
async fn healthz() -> &'static str {
    "ok"
}

/// kuma sends json by default but can be configured to send form data
fn parse_payload(headers: &HeaderMap, body: &[u8]) -> Result<AlertPayload> {
    if body.is_empty() {
        return Ok(AlertPayload::default());
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/x-www-form-urlencoded") {
        serde_urlencoded::from_bytes(body).context("invalid form payload")
    } else {
        serde_json::from_slice(body).context("invalid json payload")
    }
}

/// the relay handler: secret check, normalize, render, forward, respond
///
/// every failure past the secret check is reported to the caller as a generic
/// relay_failed, the detail only goes to the log
async fn kuma_webhook(
    Extension(state): Extension<Arc<State>>,
    headers: HeaderMap,
    ContentLengthLimit(body): ContentLengthLimit<Bytes, MAX_PAYLOAD_LEN>,
) -> (StatusCode, Json<Value>) {
    let metrics = RelayMetrics::global();

    if let Some(secret) = &state.settings.shared_secret {
        let supplied = headers
            .get(SECRET_HEADER)
            .and_then(|value| value.to_str().ok());

        if supplied != Some(secret.as_str()) {
            metrics.unauthorized_requests.inc();
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "unauthorized" })),
            );
        }
    }

    metrics.received_alerts.inc();

    // diagnostic log of the raw payload, nothing is redacted
    tracing::info!(
        payload = %String::from_utf8_lossy(&body),
        "received alert payload"
    );

    let payload = match parse_payload(&headers, &body) {
        Ok(payload) => payload,
        Err(err) => {
            metrics.relay_failures.inc();
            tracing::error!("failed to parse alert payload: {err:#}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "relay_failed" })),
            );
        }
    };

    let alert = NormalizedAlert::from_payload(&payload);
    let message = render_message(&alert, state.settings.message_prefix.as_deref());

    match state.chatwork.post_message(&message).await {
        Ok(()) => {
            metrics.relayed_messages.inc();
            (StatusCode::OK, Json(json!({ "ok": true })))
        }
        Err(err) => {
            metrics.relay_failures.inc();
            match &err {
                ForwardError::Remote { status, body } => {
                    tracing::error!(%status, body = body.as_str(), "chatwork relay failed");
                }
                ForwardError::Transport(err) => {
                    tracing::error!("chatwork relay failed: {err}");
                }
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "relay_failed" })),
            )
        }
    }
}

pub fn router(state: Arc<State>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/webhook/kuma", post(kuma_webhook))
        .route("/metrics", get(telemetry_endpoint::metrics_handler))
        .layer(Extension(state))
}

pub async fn run(settings: Settings) -> Result<()> {
    let state = Arc::new(State::new(settings).context("failed to construct chatwork client")?);
    let addr = state.settings.to_socket_addr();

    tracing::info!("kuma webhook receiver listening on {addr}");

    axum::Server::bind(&addr)
        .serve(router(state).into_make_service())
        .await
        .context("kuma webhook receiver crashed")?;

    Ok(())
}
