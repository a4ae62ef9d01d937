use std::path::PathBuf;

use thiserror::Error;

/// Why a house model could not be turned into a scene.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to parse glTF: {0}")]
    Parse(#[from] gltf::Error),
    #[error("glTF document contains no scene")]
    NoScene,
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid viewer config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid viewer config: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}
