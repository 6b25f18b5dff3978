use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to get base directories.")]
    BaseDirsFailed,

    #[error("Failed to create directory: {0:?}. (Error: {1:?})")]
    CreateDirAllFailed(PathBuf, std::io::Error),

    #[error("Failed to read the file: {0:?}. (Error: {1:?})")]
    FileReadFailed(PathBuf, std::io::Error),

    #[error("Failed to write to the file: {0:?}. (Error: {1:?})")]
    FileWriteFailed(PathBuf, std::io::Error),

    #[error("Parsing the toml file failed: {0:?}. (Error: {1:?})")]
    TomlParsingFailed(PathBuf, toml::de::Error),

    #[error("Formatting toml failed for {0}. (Error: {1:?})")]
    TomlFormattingFailed(String, toml::ser::Error),

    #[error("Parsing the json file failed: {0:?}. (Error: {1:?})")]
    JsonParsingFailed(PathBuf, serde_json::Error),

    #[error("Formatting json failed for {0}. (Error: {1:?})")]
    JsonFormattingFailed(String, serde_json::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to decode kline row: {0}")]
    KlineDecodeFailed(String),

    #[error("Unknown theme name: {0}")]
    UnknownThemeName(String),

    #[error("Terminal draw failed. (Error: {0:?})")]
    Draw(std::io::Error),

    #[error("Event channel closed.")]
    EventChannelClosed(#[from] std::sync::mpsc::RecvError),
}
