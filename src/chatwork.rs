//! outbound client for the chatwork room messages api

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::settings::Settings;

/// chatwork api token header
const TOKEN_HEADER: &str = "X-ChatWorkToken";

/// ceiling for one outbound request, connection setup included
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Error forwarding a message to chatwork. Remote rejections keep the status
/// and response body around so the failure can be logged for the operator,
/// the caller treats both variants the same.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("chatwork responded with {status}: {body}")]
    Remote { status: StatusCode, body: String },
    #[error("chatwork request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// posts rendered messages into a single chatwork room
///
/// holds the process-wide connection pool, shared read-only between requests
#[derive(Debug, Clone)]
pub struct ChatworkClient {
    http: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl ChatworkClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to construct http client")?;

        let mut endpoint = Url::parse(settings.chatwork_api_base.as_str())
            .context("invalid chatwork api base url")?;
        endpoint
            .path_segments_mut()
            .map_err(|_| anyhow::anyhow!("chatwork api base cannot be a base url"))?
            .pop_if_empty()
            .extend(["rooms", settings.chatwork_room_id.as_str(), "messages"]);

        Ok(Self {
            http,
            endpoint,
            token: settings.chatwork_token.clone(),
        })
    }

    /// post a single message body into the room
    ///
    /// form-encoded per the chatwork api; any non-2xx response or transport
    /// error is a [ForwardError], there are no retries
    pub async fn post_message(&self, body: &str) -> Result<(), ForwardError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(TOKEN_HEADER, self.token.as_str())
            .form(&[("body", body)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForwardError::Remote { status, body });
        }

        Ok(())
    }
}
