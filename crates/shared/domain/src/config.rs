use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level API configuration shared across services.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfigInner {
    pub server: ServerConfig,
    pub contracts: ContractsConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(flatten, default)]
    inner: Arc<ApiConfigInner>,
}

impl Deref for ApiConfig {
    type Target = ApiConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for ApiConfig {
    fn deref_mut(&mut self) -> &mut ApiConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
    pub ssl: Option<SslConfig>,
}

/// TLS certificate/key paths.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SslConfig {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Host-wide defaults applied to every serialization contract.
///
/// A type's own `#[contract(..)]` settings win over these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    /// Omit null members.
    pub skip_null: bool,
    /// Omit members holding their type's default value.
    pub skip_default: bool,
    /// Drop self-referencing members instead of failing.
    pub ignore_reference_cycles: bool,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name used for log file names.
    pub name: String,
    /// Default level when no filter is set (`info`, `debug`, ..).
    pub level: String,
    /// Full `EnvFilter` directive, overrides `level`.
    pub filter: Option<String>,
    /// Emit JSON lines instead of the compact format.
    pub json: bool,
    /// Enables daily-rolling file output into this directory.
    pub directory: Option<PathBuf>,
}

// --- Default ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 4583, ssl: None }
    }
}

impl Default for SslConfig {
    fn default() -> Self {
        Self { cert: PathBuf::from("cert.pem"), key: PathBuf::from("key.pem") }
    }
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self { skip_null: true, skip_default: true, ignore_reference_cycles: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "polycase".to_owned(),
            level: "info".to_owned(),
            filter: None,
            json: false,
            directory: None,
        }
    }
}
