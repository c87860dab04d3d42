use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub confirmation: ConfirmationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    /// When set, replaces the context-derived passenger identity for every
    /// call. Non-production use only.
    #[serde(default)]
    pub passenger_override: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfirmationConfig {
    pub url: String,
    #[serde(default = "default_confirmation_timeout")]
    pub timeout_seconds: u64,
}

fn default_confirmation_timeout() -> u64 {
    30
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables with a TERN prefix,
            // e.g. TERN__IDENTITY__PASSENGER_OVERRIDE
            .add_source(config::Environment::with_prefix("TERN").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
