//! Here we expose prometheus metrics about the relay

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Response},
};
use once_cell::sync::OnceCell;
use prometheus::{opts, register_int_counter, Encoder, IntCounter, TextEncoder};

/// prometheus meters for the webhook relay
#[derive(Debug)]
pub struct RelayMetrics {
    /// total number of inbound webhook requests that passed the secret check
    pub received_alerts: IntCounter,
    /// number of messages successfully forwarded to chatwork
    pub relayed_messages: IntCounter,
    /// number of requests that failed during parsing or forwarding
    pub relay_failures: IntCounter,
    /// number of requests rejected by the shared secret check
    pub unauthorized_requests: IntCounter,
}

static METRICS: OnceCell<RelayMetrics> = OnceCell::new();

impl RelayMetrics {
    /// process-global meters, registered once
    pub fn global() -> &'static Self {
        #[allow(clippy::expect_used)]
        METRICS.get_or_init(|| Self::new().expect("failed to register prometheus meters"))
    }

    fn new() -> Result<Self, prometheus::Error> {
        let received_alerts = register_int_counter!(opts!(
            "received_alerts_total",
            "total number of inbound alerts passing the secret check"
        )
        .namespace("kuma_relay")
        .subsystem("webhook"))?;

        let relayed_messages = register_int_counter!(opts!(
            "relayed_messages_total",
            "number of messages forwarded to chatwork"
        )
        .namespace("kuma_relay")
        .subsystem("webhook"))?;

        let relay_failures = register_int_counter!(opts!(
            "relay_failures_total",
            "number of requests failing during parsing or forwarding"
        )
        .namespace("kuma_relay")
        .subsystem("webhook"))?;

        let unauthorized_requests = register_int_counter!(opts!(
            "unauthorized_requests_total",
            "number of requests rejected by the shared secret check"
        )
        .namespace("kuma_relay")
        .subsystem("webhook"))?;

        Ok(Self {
            received_alerts,
            relayed_messages,
            relay_failures,
            unauthorized_requests,
        })
    }
}

pub async fn metrics_handler() -> Response<Body> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder.encode(&metric_families, &mut buffer).unwrap();

    Response::builder()
        .status(200)
        .header(CONTENT_TYPE, encoder.format_type())
        .body(Body::from(buffer))
        .unwrap()
}
