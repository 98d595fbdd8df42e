use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides (`POLYCASE__SERVER__PORT=8080`).
pub const ENV_PREFIX: &str = "POLYCASE";

/// Custom error type for config loading.
#[polycase_derive::polycase_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that combines file-based settings with environment overrides.
///
/// This function implements a layered configuration strategy:
/// 1. **Base File**: Loads settings from a TOML file (e.g., `server.toml`). If no path is
///    provided, it defaults to `"server"`. A missing file is not an error: every section
///    falls back to its defaults.
/// 2. **Environment Overrides**: Overlays values from environment variables prefixed with
///    `POLYCASE__`. Nested structures are accessed using double underscores
///    (e.g., `POLYCASE__CONTRACTS__SKIP_NULL=false` maps to `contracts.skip_null`).
///
/// # Errors
/// This function will return an error if:
/// * The file exists but is not valid TOML.
/// * The merged values do not match the structure of type `T`.
///
/// # Example
/// ```rust
/// use polycase_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, None)
}

/// [`load_config`] with an explicit environment instead of the process one.
///
/// # Errors
/// See [`load_config`].
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    env: Map<String, String>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, Some(env))
}

fn load_layered<T>(
    path: Option<impl AsRef<Path>>,
    env: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake)
                .try_parsing(true)
                .source(env),
        );

    info!("Loading config from {}", effective_path.display());

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
