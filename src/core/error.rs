use thiserror::Error;

use crate::stealth::channel::SenseChannel;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{channel:?} alert has no parent action")]
    MissingParent { channel: SenseChannel },

    #[error("Perception for {0:?} already registered")]
    DuplicateChannel(SenseChannel),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, DetectionError>;
