//! Utilities for storing a struct in a file on the disk.
//! The struct should implement Serialize and Deserialize from serde.
//! Supported file formats are TOML and JSON.

use std::{fmt::Debug, fs, path::PathBuf};

use directories::BaseDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub enum FileFormat {
    TOML,
    JSON,
}

pub trait DiskInterface
where
    Self: Sized + Debug + Default + Serialize + DeserializeOwned,
{
    const FILE_NAME: &'static str;
    const FORMAT: FileFormat;

    /// Get the path to the file
    fn path() -> crate::Result<PathBuf> {
        let dirs = BaseDirs::new().ok_or(crate::Error::BaseDirsFailed)?;
        let path = dirs
            .home_dir()
            .join(".chartline")
            .join(Self::FILE_NAME)
            .with_extension(match Self::FORMAT {
                FileFormat::TOML => "toml",
                FileFormat::JSON => "json",
            });
        Ok(path)
    }

    /// Load the content from the file if it exists otherwise return the default value
    fn load() -> crate::Result<Self> {
        let path = Self::path()?;

        if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| crate::Error::FileReadFailed(path.clone(), e))?;

            match Self::FORMAT {
                FileFormat::TOML => {
                    toml::from_str(&content).map_err(|e| crate::Error::TomlParsingFailed(path, e))
                }
                FileFormat::JSON => serde_json::from_str(&content)
                    .map_err(|e| crate::Error::JsonParsingFailed(path, e)),
            }
        } else {
            Ok(Self::default())
        }
    }

    /// Save content to a file, creating the directories and file as necessary
    fn save(&self) -> crate::Result<()> {
        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| crate::Error::CreateDirAllFailed(path.clone(), e))?;
        }

        let content = match Self::FORMAT {
            FileFormat::TOML => toml::to_string_pretty(self)
                .map_err(|e| crate::Error::TomlFormattingFailed(format!("{self:?}"), e))?,
            FileFormat::JSON => serde_json::to_string(self)
                .map_err(|e| crate::Error::JsonFormattingFailed(format!("{self:?}"), e))?,
        };

        fs::write(&path, content).map_err(|e| crate::Error::FileWriteFailed(path, e))?;

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub symbol: String,
    pub interval: String,
    pub candle_limit: u32,
    pub candle_api_url: String,
    pub alert_api_url: String,
    pub theme_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: "1h".to_string(),
            candle_limit: 100,
            candle_api_url: "https://api.binance.com".to_string(),
            alert_api_url: "http://127.0.0.1:5000".to_string(),
            theme_name: "Dark".to_string(),
        }
    }
}

impl DiskInterface for Config {
    const FILE_NAME: &'static str = "config";
    const FORMAT: FileFormat = FileFormat::TOML;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
    struct ScratchBlob {
        entries: Vec<String>,
    }

    impl DiskInterface for ScratchBlob {
        const FILE_NAME: &'static str = "scratch-blob-test";
        const FORMAT: FileFormat = FileFormat::JSON;
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = ScratchBlob::path().unwrap();
        let _ = fs::remove_file(&path);

        // missing file loads the default value
        let blob = ScratchBlob::load().unwrap();
        assert_eq!(blob, ScratchBlob::default());

        let blob = ScratchBlob {
            entries: vec!["one".to_string(), "two".to_string()],
        };
        blob.save().unwrap();

        let reloaded = ScratchBlob::load().unwrap();
        assert_eq!(reloaded, blob);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.symbol, "BTCUSDT");
        assert_eq!(config.interval, "1h");
        assert_eq!(config.candle_limit, 100);
    }
}
