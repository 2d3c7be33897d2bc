use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, Result};
use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// default chatwork api base url, overridable for tests
const DEFAULT_API_BASE: &str = "https://api.chatwork.com/v2";

/// relay configuration, read once from the process environment at startup and
/// passed explicitly into the webhook receiver
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    pub chatwork_token: String,
    pub chatwork_room_id: String,
    #[serde(default = "default_api_base")]
    pub chatwork_api_base: String,
    #[serde(default)]
    pub shared_secret: Option<String>,
    #[serde(default)]
    pub message_prefix: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

fn default_api_base() -> String {
    String::from(DEFAULT_API_BASE)
}

fn default_log_level() -> String {
    String::from("info")
}

/// serde reports absent required fields through `Error::missing_field`, which
/// the config crate surfaces as a plain message
fn is_missing_field(err: &ConfigError) -> bool {
    match err {
        ConfigError::NotFound(_) => true,
        ConfigError::Message(msg) => msg.starts_with("missing field"),
        _ => false,
    }
}

impl Settings {
    /// load settings from the environment (PORT, CHATWORK_TOKEN,
    /// CHATWORK_ROOM_ID, SHARED_SECRET, ...)
    pub fn load() -> Result<Self> {
        let conf = Config::builder()
            .add_source(Environment::default())
            .build()
            .context("can't read environment")?;

        Self::from_config(conf)
    }

    fn from_config(conf: Config) -> Result<Self> {
        conf.try_deserialize().map_err(|err| {
            if is_missing_field(&err) {
                anyhow::Error::new(err).context("CHATWORK_TOKEN and CHATWORK_ROOM_ID are required")
            } else {
                anyhow::Error::new(err).context("invalid configuration value")
            }
        })
    }

    pub fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}
