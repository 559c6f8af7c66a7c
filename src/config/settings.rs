//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::domain::SessionId;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Session server endpoint (host, port, TLS)
    pub server: ServerSettings,

    /// Share link configuration
    pub share: ShareSettings,

    /// Participant identity persistence
    pub identity: IdentitySettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Session server endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host name of the session server (e.g. "localhost")
    pub host: String,

    /// Port number the session server listens on
    pub port: u16,

    /// Whether to use https/wss when talking to the server
    pub use_tls: bool,
}

/// Share link configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShareSettings {
    /// Path component of generated share links (usually "/")
    pub path: String,
}

/// Participant identity persistence configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentitySettings {
    /// File holding the persisted participant id
    pub path: String,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.host", "localhost")?
            .set_default("server.port", 8080)?
            .set_default("server.use_tls", false)?
            .set_default("share.path", "/")?
            .set_default("identity.path", ".locshare/participant_id")?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            // Map simple environment variables
            .set_override_option("server.host", std::env::var("SERVER_HOST").ok())?
            .set_override_option("server.port", std::env::var("SERVER_PORT").ok())?
            .build()?
            .try_deserialize()
    }

    /// Origin of the session server, e.g. "https://example.com:443".
    pub fn origin(&self) -> String {
        let scheme = if self.server.use_tls { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.server.host, self.server.port)
    }

    /// Base URL of the session REST API.
    pub fn api_base(&self) -> String {
        format!("{}/api", self.origin())
    }

    /// Duplex endpoint for one session.
    pub fn ws_url(&self, session: &SessionId) -> String {
        let scheme = if self.server.use_tls { "wss" } else { "ws" };
        format!(
            "{}://{}:{}/ws/{}",
            scheme, self.server.host, self.server.port, session
        )
    }
}
