// Global configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::DeviceTarget;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub bridge: BridgeConfig,

    #[serde(default)]
    pub engine: EngineConfig,

    #[serde(default)]
    pub packages: PackagesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    /// Alternate row background colors in list views
    #[serde(default)]
    pub alternate_row_colors: RowColoring,

    /// Case of hex digits in displayed addresses
    #[serde(default)]
    pub hex_style: HexCase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// adb executable (name on PATH or absolute path)
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// frida-ps executable used for remote process listings
    #[serde(default = "default_frida_ps_path")]
    pub frida_ps_path: String,

    /// adb device serial; unset lets adb pick the only attached device
    #[serde(default)]
    pub serial: Option<String>,

    /// Instrumentation device: local, usb, remote, host:<addr> or id:<serial>
    #[serde(default)]
    pub device: DeviceTarget,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Whether the target runs a Java VM (enables Java and module-load hooks)
    #[serde(default)]
    pub java_available: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesConfig {
    /// Show the APK path column next to the package name
    #[serde(default = "default_true_config")]
    pub show_paths: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a log file next to the config file
    #[serde(default)]
    pub enabled: bool,

    /// Filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_frida_ps_path() -> String {
    "frida-ps".to_string()
}

fn default_true_config() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            frida_ps_path: default_frida_ps_path(),
            serial: None,
            device: DeviceTarget::default(),
        }
    }
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            show_paths: default_true_config(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: default_log_level(),
        }
    }
}

// Older config files stored these preferences as either booleans or strings.
// Both spellings are accepted and resolved to an enum here, once.
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowColoring {
    #[default]
    Plain,
    Alternate,
}

impl RowColoring {
    pub fn is_alternate(self) -> bool {
        self == Self::Alternate
    }
}

impl Serialize for RowColoring {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.is_alternate())
    }
}

impl<'de> Deserialize<'de> for RowColoring {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let alternate = match LooseValue::deserialize(deserializer)? {
            LooseValue::Bool(b) => b,
            LooseValue::Text(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "alternate"),
        };
        Ok(if alternate {
            Self::Alternate
        } else {
            Self::Plain
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexCase {
    #[default]
    Upper,
    Lower,
}

impl HexCase {
    /// Format an address as `0x...` in this case.
    pub fn format(self, ptr: u64) -> String {
        match self {
            Self::Upper => format!("0x{:X}", ptr),
            Self::Lower => format!("0x{:x}", ptr),
        }
    }
}

impl Serialize for HexCase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            Self::Upper => "upper",
            Self::Lower => "lower",
        })
    }
}

impl<'de> Deserialize<'de> for HexCase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let upper = match LooseValue::deserialize(deserializer)? {
            LooseValue::Bool(b) => b,
            LooseValue::Text(s) => s.trim().eq_ignore_ascii_case("upper"),
        };
        Ok(if upper { Self::Upper } else { Self::Lower })
    }
}

impl Config {
    /// Directory holding config.toml and the log file
    pub fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Could not determine config directory")?
            .join("hookdash"))
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from disk, or create default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();

            // A read-only config directory is not fatal
            if let Err(e) = config.save() {
                eprintln!("Warning: Could not create default config file: {:#}", e);
                eprintln!(
                    "Using built-in defaults. Run 'hookdash init-config' to create a config file."
                );
            }

            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Check if config file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }
}
