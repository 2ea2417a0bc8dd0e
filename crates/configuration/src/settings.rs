use crate::error::ConfigError;
use core_types::ChartType;
use serde::Deserialize;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty or missing `config.toml` yields a
/// working local setup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub data: DataSettings,
    pub logging: LoggingSettings,
}

/// Where the HTTP API listens.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// An IP address or a resolvable host name.
    pub host: String,
    pub port: u16,
}

/// Location of the JSON fixtures, one file per chart type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub customer_file: String,
    pub team_file: String,
    pub industry_file: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// Also write JSON logs to a daily rolling file.
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_prefix: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            customer_file: "Customer Type.json".to_string(),
            team_file: "Team.json".to_string(),
            industry_file: "Account Industry.json".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("logs"),
            file_prefix: "acv-dashboard.log".to_string(),
        }
    }
}

impl Settings {
    /// Rejects settings that would only fail later at bind or load time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::ValidationError("server.host must not be empty".to_string()));
        }
        for (key, name) in [
            ("data.customer_file", &self.data.customer_file),
            ("data.team_file", &self.data.team_file),
            ("data.industry_file", &self.data.industry_file),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("{key} must not be empty")));
            }
        }
        if self.logging.file_enabled && self.logging.file_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.file_prefix must not be empty when file logging is enabled".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves `server.host:server.port` to the first matching address.
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        let endpoint = (self.server.host.as_str(), self.server.port);
        endpoint
            .to_socket_addrs()
            .map_err(|e| {
                ConfigError::ValidationError(format!(
                    "cannot resolve {}:{}: {e}",
                    self.server.host, self.server.port
                ))
            })?
            .next()
            .ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "no address found for {}:{}",
                    self.server.host, self.server.port
                ))
            })
    }
}

impl DataSettings {
    /// The fixture file backing `chart`.
    pub fn path_for(&self, chart: ChartType) -> PathBuf {
        let file = match chart {
            ChartType::Customer => &self.customer_file,
            ChartType::Team => &self.team_file,
            ChartType::AccountIndustry => &self.industry_file,
        };
        self.dir.join(file)
    }
}

/// Command-line overrides for the `[server]` section.
#[cfg(feature = "clap")]
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ServerOverrides {
    /// Address to bind, overriding `server.host`.
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind, overriding `server.port`.
    #[arg(long)]
    pub port: Option<u16>,
}

#[cfg(feature = "clap")]
impl ServerOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.server.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
    }
}
