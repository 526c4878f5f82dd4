use std::env;

use log::*;
use payhere_tools::PayHereConfig;
use payment_common::helpers::parse_boolean_flag;

use crate::errors::ServerError;

const DEFAULT_PGV_HOST: &str = "127.0.0.1";
const DEFAULT_PGV_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/payments.db";

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
    pub payhere: PayHereConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_PGV_HOST.to_string(),
            port: DEFAULT_PGV_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            use_x_forwarded_for: false,
            use_forwarded: false,
            payhere: PayHereConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("PGV_HOST").ok().unwrap_or_else(|| DEFAULT_PGV_HOST.into());
        let port = env::var("PGV_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for PGV_PORT. {e} Using the default, {DEFAULT_PGV_PORT}, instead."
                    );
                    DEFAULT_PGV_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_PGV_PORT);
        let database_url = env::var("PGV_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ PGV_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let use_x_forwarded_for = parse_boolean_flag(env::var("PGV_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("PGV_USE_FORWARDED").ok(), false);
        let payhere = PayHereConfig::new_from_env_or_default();
        Self { host, port, database_url, use_x_forwarded_for, use_forwarded, payhere }
    }

    /// Checks that the server can do its job. The server refuses to start otherwise.
    pub fn validate(&self) -> Result<(), ServerError> {
        if self.database_url.trim().is_empty() {
            return Err(ServerError::ConfigurationError("The database URL is empty".to_string()));
        }
        self.payhere.validate().map_err(|e| ServerError::ConfigurationError(e.to_string()))
    }

    pub fn proxy_config(&self) -> ProxyConfig {
        ProxyConfig { use_x_forwarded_for: self.use_x_forwarded_for, use_forwarded: self.use_forwarded }
    }
}

/// How to find the address of the peer behind a reverse proxy.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProxyConfig {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}
