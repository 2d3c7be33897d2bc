//! uptime kuma webhook receiver that forwards alerts into a chatwork room
//!
//! Features:
//! - accepts kuma alert payloads as json or url-encoded form data
//! - normalizes the two payload shapes kuma is known to send
//! - optional shared secret check on the inbound webhook
//! - prometheus counters exposed on /metrics

use anyhow::{Context, Result};

use crate::settings::Settings;

mod alert;
mod alert_renderer;
mod chatwork;
mod kuma_webhook_receiver;
mod log;
mod settings;
mod telemetry_endpoint;

/// exit the complete program if one thread panics
fn setup_panic_handler() {
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        default_panic(info);
        std::process::exit(1);
    }));
}

/// the entry point of the program
#[tokio::main]
pub async fn main() -> Result<()> {
    setup_panic_handler();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(err) => {
            // tracing isn't setup yet, a half-configured relay must not bind
            eprintln!("ERROR: {err:#}");
            std::process::exit(1);
        }
    };

    log::setup_logging(&settings.log_level).context("could not setup logging")?;

    kuma_webhook_receiver::run(settings).await
}
