use crate::error::ConfigError;
use crate::models::palette::PaletteConfig;
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Embedded default config
#[derive(RustEmbed)]
#[folder = "."]
#[include = "config.yaml"]
struct EmbeddedConfig;

const EMBEDDED_CONFIG_FILE: &str = "config.yaml";

/// Config file used when neither `--config` nor `CHROMA_CONFIG` is given
pub const DEFAULT_CONFIG_PATH: &str = "chroma.yaml";

/// Application configuration loaded from chroma.yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Controller connection settings
    #[serde(default)]
    pub connection: ConnectionSettings,

    /// Dark UI theme
    #[serde(default)]
    pub dark_mode: bool,

    /// Where the color history is persisted
    #[serde(default = "default_history_file")]
    pub history_file: PathBuf,

    /// Maximum number of history entries
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Named color palettes
    #[serde(default)]
    pub palettes: Vec<PaletteConfig>,
}

fn default_history_file() -> PathBuf {
    PathBuf::from("color_history.json")
}

fn default_history_capacity() -> usize {
    10
}

/// Where the active configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    /// Read from the given file
    File(PathBuf),
    /// File missing or unreadable, embedded defaults in use
    Embedded,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigOrigin::File(path) => write!(f, "{}", path.display()),
            ConfigOrigin::Embedded => write!(f, "embedded"),
        }
    }
}

impl AppConfig {
    /// Pick the config path: explicit flag, then `CHROMA_CONFIG`, then `chroma.yaml`.
    pub fn resolve_path(explicit: Option<PathBuf>) -> PathBuf {
        explicit
            .or_else(|| std::env::var("CHROMA_CONFIG").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Defaults shipped inside the binary
    pub fn embedded() -> Self {
        let Some(file) = EmbeddedConfig::get(EMBEDDED_CONFIG_FILE) else {
            tracing::warn!("Embedded config missing, using built-in defaults");
            return Self::default();
        };

        match serde_yaml::from_slice(&file.data) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(%e, "Failed to parse embedded config, using built-in defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`, falling back to the embedded defaults.
    ///
    /// A missing file is normal on first start. A malformed file is logged
    /// and ignored rather than aborting start-up.
    pub fn load(path: &Path) -> (Self, ConfigOrigin) {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using embedded defaults");
                return (Self::embedded(), ConfigOrigin::Embedded);
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), %e, "Failed to read config, using defaults");
                return (Self::embedded(), ConfigOrigin::Embedded);
            }
        };

        match serde_yaml::from_str::<Self>(&content) {
            Ok(mut config) => {
                if config.palettes.is_empty() {
                    config.palettes = Self::embedded().palettes;
                }
                tracing::info!(
                    path = %path.display(),
                    connection_type = %config.connection.connection_type,
                    palettes = config.palettes.len(),
                    "Loaded configuration"
                );
                (config, ConfigOrigin::File(path.to_path_buf()))
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), %e, "Failed to parse config, using defaults");
                (Self::embedded(), ConfigOrigin::Embedded)
            }
        }
    }

    /// Write the configuration to `path` as YAML.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Saved configuration");
        Ok(())
    }

    /// Flip the dark-mode flag and return the new value.
    pub fn toggle_dark_mode(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionSettings::default(),
            dark_mode: false,
            history_file: default_history_file(),
            history_capacity: default_history_capacity(),
            palettes: Vec::new(),
        }
    }
}

/// Which transport the adapter drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    None,
    Network,
    Serial,
}

impl TransportKind {
    /// Tag used in the config file
    pub fn as_str(self) -> &'static str {
        match self {
            TransportKind::None => "none",
            TransportKind::Network => "modbus",
            TransportKind::Serial => "serial",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(TransportKind::None),
            "modbus" | "network" => Ok(TransportKind::Network),
            "serial" => Ok(TransportKind::Serial),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

/// Connection settings as persisted or edited by the operator.
///
/// Field names match the configuration file. Nothing here is trusted:
/// [`ConnectionSettings::validate`] turns it into a [`DeviceConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionSettings {
    /// `none`, `modbus` (alias `network`) or `serial`
    #[serde(default = "default_connection_type")]
    pub connection_type: String,

    /// Modbus host address
    #[serde(default = "default_plc_ip")]
    pub plc_ip: String,

    /// Modbus TCP port
    #[serde(default = "default_plc_port")]
    pub plc_port: u32,

    /// Serial device path (e.g. /dev/ttyUSB0 or COM3)
    #[serde(default)]
    pub serial_port: Option<String>,

    /// Serial baud rate
    #[serde(default = "default_baudrate")]
    pub baudrate: u32,
}

fn default_connection_type() -> String {
    "none".to_string()
}

fn default_plc_ip() -> String {
    "192.168.0.10".to_string()
}

fn default_plc_port() -> u32 {
    502
}

fn default_baudrate() -> u32 {
    9600
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            connection_type: default_connection_type(),
            plc_ip: default_plc_ip(),
            plc_port: default_plc_port(),
            serial_port: None,
            baudrate: default_baudrate(),
        }
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::NotANumber {
            field,
            value: value.to_string(),
        })
}

impl ConnectionSettings {
    /// Set the Modbus port from form text.
    pub fn set_port(&mut self, value: &str) -> Result<(), ConfigError> {
        self.plc_port = parse_number("port", value)?;
        Ok(())
    }

    /// Set the serial baud rate from form text.
    pub fn set_baud_rate(&mut self, value: &str) -> Result<(), ConfigError> {
        self.baudrate = parse_number("baud rate", value)?;
        Ok(())
    }

    /// Validate the settings and select the transport.
    pub fn validate(&self) -> Result<DeviceConfig, ConfigError> {
        match self.connection_type.parse::<TransportKind>()? {
            TransportKind::None => Ok(DeviceConfig::None),
            TransportKind::Network => {
                let host = self.plc_ip.trim();
                if host.is_empty() {
                    return Err(ConfigError::Missing("PLC host address"));
                }
                let port = u16::try_from(self.plc_port)
                    .ok()
                    .filter(|port| *port != 0)
                    .ok_or(ConfigError::InvalidPort(self.plc_port))?;
                Ok(DeviceConfig::Network {
                    host: host.to_string(),
                    port,
                })
            }
            TransportKind::Serial => {
                let path = self
                    .serial_port
                    .as_deref()
                    .map(str::trim)
                    .filter(|path| !path.is_empty())
                    .ok_or(ConfigError::Missing("serial device path"))?;
                if self.baudrate == 0 {
                    return Err(ConfigError::InvalidBaudRate(self.baudrate));
                }
                Ok(DeviceConfig::Serial {
                    path: path.to_string(),
                    baud_rate: self.baudrate,
                })
            }
        }
    }
}

/// Validated transport selection with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceConfig {
    None,
    Network { host: String, port: u16 },
    Serial { path: String, baud_rate: u32 },
}

impl DeviceConfig {
    pub fn kind(&self) -> TransportKind {
        match self {
            DeviceConfig::None => TransportKind::None,
            DeviceConfig::Network { .. } => TransportKind::Network,
            DeviceConfig::Serial { .. } => TransportKind::Serial,
        }
    }
}
