//! Renders a [NormalizedAlert](crate::alert::NormalizedAlert) into the
//! message body posted to chatwork.
//!
//! The format is a fixed, ordered list of lines. Lines whose source field is
//! absent are omitted entirely rather than rendered with a placeholder,
//! except for ping which defaults to "N/A" during normalization.

use crate::alert::NormalizedAlert;

/// render the newline-joined message body for an alert
///
/// * `prefix` - optional status line prefix (MESSAGE_PREFIX); without it the
///   status line reads `Status: <status>`
pub fn render_message(alert: &NormalizedAlert, prefix: Option<&str>) -> String {
    let mut lines = Vec::new();

    match prefix {
        Some(prefix) => lines.push(format!("{prefix} {}", alert.status_text)),
        None => lines.push(format!("Status: {}", alert.status_text)),
    }

    lines.push(format!("Monitor: {}", alert.monitor_name));

    if !alert.monitor_url.is_empty() {
        lines.push(format!("URL: {}", alert.monitor_url));
    }

    if let Some(http_code) = &alert.http_code {
        lines.push(format!("HTTP: {http_code}"));
    }

    lines.push(format!("Ping: {} ms", alert.ping));

    if let Some(duration) = &alert.duration_seconds {
        lines.push(format!("Duration: {duration}s"));
    }

    if let Some(local_time) = &alert.local_time {
        let timezone = alert.timezone.as_deref().unwrap_or("local");
        lines.push(format!("Time ({timezone}): {local_time}"));
    }

    if let Some(message) = &alert.message {
        lines.push(String::new());
        lines.push(message.clone());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::alert::AlertPayload;

    fn alert(value: serde_json::Value) -> NormalizedAlert {
        let payload: AlertPayload = serde_json::from_value(value).unwrap();
        NormalizedAlert::from_payload(&payload)
    }

    #[test]
    fn renders_the_documented_lines_without_prefix() {
        let alert = alert(json!({
            "monitorName": "API",
            "status": 1,
            "ping": 42,
            "monitorUrl": "https://x"
        }));

        assert_eq!(
            render_message(&alert, None),
            "Status: UP\nMonitor: API\nURL: https://x\nPing: 42 ms"
        );
    }

    #[test]
    fn prefix_replaces_the_status_label() {
        let alert = alert(json!({ "status": 0, "monitorName": "API" }));

        assert_eq!(
            render_message(&alert, Some("[kuma]")),
            "[kuma] DOWN\nMonitor: API\nPing: N/A ms"
        );
    }

    #[test]
    fn optional_lines_are_rendered_when_present() {
        let alert = alert(json!({
            "monitorName": "API",
            "httpCode": 503,
            "heartbeat": {
                "status": 0,
                "ping": 7,
                "duration": 120,
                "timezone": "UTC",
                "localDateTime": "2022-05-21 04:00:00",
                "msg": "503 Service Unavailable"
            }
        }));

        assert_eq!(
            render_message(&alert, None),
            "Status: DOWN\n\
             Monitor: API\n\
             HTTP: 503\n\
             Ping: 7 ms\n\
             Duration: 120s\n\
             Time (UTC): 2022-05-21 04:00:00\n\
             \n\
             503 Service Unavailable"
        );
    }

    #[test]
    fn timezone_falls_back_to_local() {
        let alert = alert(json!({
            "heartbeat": { "localDateTime": "2022-05-21 04:00:00" }
        }));

        assert!(render_message(&alert, None)
            .contains("Time (local): 2022-05-21 04:00:00"));
    }

    #[test]
    fn empty_payload_still_renders() {
        let alert = alert(json!({}));

        assert_eq!(
            render_message(&alert, None),
            "Status: UNKNOWN\nMonitor: Unknown Monitor\nPing: N/A ms"
        );
    }
}
