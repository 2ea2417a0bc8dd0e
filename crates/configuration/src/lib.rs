use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
#[cfg(feature = "clap")]
pub use settings::ServerOverrides;
pub use settings::{DataSettings, LoggingSettings, ServerSettings, Settings};

/// Environment variables override file values, e.g. `DASHBOARD__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "DASHBOARD";

/// Loads and validates the application settings.
///
/// Sources are layered: built-in defaults, then the TOML file at `path` if it
/// exists, then `DASHBOARD__*` environment variables.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Settings` struct
    let settings = builder.try_deserialize::<Settings>()?;
    settings.validate()?;

    Ok(settings)
}
