// src/errors.rs
use std::fmt;

#[derive(Debug)]
pub enum CrowdRunError {
    IoError(std::io::Error),
    ConfigError(String),
    LevelLoadError(String),
    SaveError(String),
    CryptoError(String),
}

impl fmt::Display for CrowdRunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CrowdRunError::IoError(err) => write!(f, "IO Error: {}", err),
            CrowdRunError::ConfigError(msg) => write!(f, "Config Error: {}", msg),
            CrowdRunError::LevelLoadError(msg) => write!(f, "Level Load Error: {}", msg),
            CrowdRunError::SaveError(msg) => write!(f, "Save Error: {}", msg),
            CrowdRunError::CryptoError(msg) => write!(f, "Crypto Error: {}", msg),
        }
    }
}

impl std::error::Error for CrowdRunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrowdRunError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CrowdRunError {
    fn from(err: std::io::Error) -> Self {
        CrowdRunError::IoError(err)
    }
}

impl From<serde_json::Error> for CrowdRunError {
    fn from(err: serde_json::Error) -> Self {
        CrowdRunError::ConfigError(err.to_string())
    }
}
