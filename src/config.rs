//! Configuration file handling

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub device: DeviceConfig,
    pub listen: ListenConfig,
    /// Key images uploaded by `set images`, keyed by logical key index
    pub keys: BTreeMap<String, PathBuf>,
}

impl Config {
    /// Get the config file path for this platform
    pub fn path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "deck-sync").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load config from file, or create default if it doesn't exist
    pub fn load_or_create() -> Result<Self, Box<dyn Error>> {
        let path = Self::path().ok_or("could not determine config directory")?;

        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_with_header()?;
            println!("created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Save config with header comments for new files
    pub fn save_with_header(&self) -> Result<(), Box<dyn Error>> {
        let path = Self::path().ok_or("could not determine config directory")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let header = r#"# deck-sync configuration file
#
# [keys] maps a key index (0-14, row-major from the top left) to a
# pre-encoded key image, e.g. "0" = "/home/me/icons/mute.jpg"

"#;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, format!("{header}{contents}"))?;
        Ok(())
    }

    /// Parsed `[keys]` entries, in key order
    pub fn key_images(&self) -> Result<Vec<(usize, PathBuf)>, String> {
        self.keys
            .iter()
            .map(|(key, path)| {
                key.parse::<usize>()
                    .map(|k| (k, path.clone()))
                    .map_err(|_| format!("invalid key index in [keys]: {key:?}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|mut keys| {
                keys.sort_by_key(|(k, _)| *k);
                keys
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Brightness percent applied after `reset`
    pub brightness: u8,
    /// Default tracing filter, overridden by RUST_LOG
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            brightness: 80,
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// USB vendor id used to find the deck
    pub vendor_id: u16,
    /// USB product id used to find the deck
    pub product_id: u16,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: mirabox293s::consts::VENDOR_ID,
            product_id: mirabox293s::consts::PRODUCT_ID,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Delay between key state polls
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(20),
        }
    }
}
