//! data structures for deserializing and normalizing incoming kuma alerts
//!
//! Kuma payloads come in two shapes: a flat generic one (`monitorName`,
//! `status`, ...) and the native one nesting `monitor` and `heartbeat`
//! objects. Nothing is guaranteed to be present, so every field is optional
//! and normalization walks an ordered fallback chain per field.

use std::fmt;

use serde::{Deserialize, Serialize};

/// a raw status value as sent by kuma, either numeric (1 up, 0 down) or a
/// free-form string
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum StatusValue {
    Number(i64),
    Text(String),
}

/// a scalar that kuma may send as either a json number or a string
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => n.fmt(f),
            Scalar::Text(s) => s.fmt(f),
        }
    }
}

/// the `monitor` object of the native kuma payload
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Monitor {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// the `heartbeat` object of the native kuma payload
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Heartbeat {
    pub status: Option<StatusValue>,
    pub ping: Option<Scalar>,
    pub duration: Option<Scalar>,
    pub http_code: Option<Scalar>,
    pub timezone: Option<String>,
    pub local_date_time: Option<String>,
    pub msg: Option<String>,
}

/// an inbound alert payload, both shapes overlaid
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertPayload {
    pub status: Option<StatusValue>,
    pub state: Option<StatusValue>,
    pub monitor_name: Option<String>,
    #[serde(rename = "monitorURL", alias = "monitorUrl")]
    pub monitor_url: Option<String>,
    pub ping: Option<Scalar>,
    pub duration: Option<Scalar>,
    pub http_code: Option<Scalar>,
    pub msg: Option<String>,
    pub message: Option<String>,
    pub monitor: Option<Monitor>,
    pub heartbeat: Option<Heartbeat>,
}

/// alert fields after walking the fallback chains, ready for rendering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedAlert {
    pub status_text: String,
    pub monitor_name: String,
    pub monitor_url: String,
    pub ping: String,
    pub http_code: Option<String>,
    pub duration_seconds: Option<String>,
    pub local_time: Option<String>,
    pub timezone: Option<String>,
    pub message: Option<String>,
}

/// first non-null source wins
fn pick<'a, T>(chain: [Option<&'a T>; 3]) -> Option<&'a T> {
    chain.into_iter().flatten().next()
}

/// `1` is up, `0` is down, strings pass through lowercased, anything else is
/// uppercased, absent means unknown
fn normalize_status(raw: Option<&StatusValue>) -> String {
    match raw {
        Some(StatusValue::Number(1)) => String::from("UP"),
        Some(StatusValue::Number(0)) => String::from("DOWN"),
        Some(StatusValue::Number(other)) => other.to_string().to_uppercase(),
        Some(StatusValue::Text(text)) => text.to_lowercase(),
        None => String::from("UNKNOWN"),
    }
}

impl NormalizedAlert {
    /// Extracts the normalized fields from a raw payload. Flat generic fields
    /// take precedence, the nested kuma shape is the fallback. Never fails:
    /// every field has a documented default.
    pub fn from_payload(payload: &AlertPayload) -> Self {
        let monitor = payload.monitor.as_ref();
        let heartbeat = payload.heartbeat.as_ref();

        let status = pick([
            payload.status.as_ref(),
            payload.state.as_ref(),
            heartbeat.and_then(|h| h.status.as_ref()),
        ]);

        let monitor_name = pick([
            payload.monitor_name.as_ref(),
            monitor.and_then(|m| m.name.as_ref()),
            None,
        ]);

        let monitor_url = pick([
            payload.monitor_url.as_ref(),
            monitor.and_then(|m| m.url.as_ref()),
            None,
        ]);

        let ping = pick([
            payload.ping.as_ref(),
            heartbeat.and_then(|h| h.ping.as_ref()),
            None,
        ]);

        let http_code = pick([
            payload.http_code.as_ref(),
            heartbeat.and_then(|h| h.http_code.as_ref()),
            None,
        ]);

        let duration = pick([
            payload.duration.as_ref(),
            heartbeat.and_then(|h| h.duration.as_ref()),
            None,
        ]);

        let message = pick([
            payload.msg.as_ref(),
            payload.message.as_ref(),
            heartbeat.and_then(|h| h.msg.as_ref()),
        ]);

        Self {
            status_text: normalize_status(status),
            monitor_name: monitor_name
                .cloned()
                .unwrap_or_else(|| String::from("Unknown Monitor")),
            monitor_url: monitor_url.cloned().unwrap_or_default(),
            ping: ping
                .map(ToString::to_string)
                .unwrap_or_else(|| String::from("N/A")),
            http_code: http_code.map(ToString::to_string),
            duration_seconds: duration.map(ToString::to_string),
            local_time: heartbeat.and_then(|h| h.local_date_time.clone()),
            timezone: heartbeat.and_then(|h| h.timezone.clone()),
            message: message.cloned(),
        }
    }
}
