use std::path::PathBuf;

use crate::catalog::MediaKind;

pub type ShowResult<T> = Result<T, ShowError>;

#[derive(thiserror::Error, Debug)]
pub enum ShowError {
    #[error("catalog error: no {kind} files found in '{}'", dir.display())]
    CatalogEmpty { kind: MediaKind, dir: PathBuf },

    #[error("catalog error: cannot read {kind} folder '{}': {source}", dir.display())]
    CatalogRead {
        kind: MediaKind,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("asset load error: {0}")]
    AssetLoad(String),

    #[error("playback error: {0}")]
    Playback(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ShowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn asset_load(msg: impl Into<String>) -> Self {
        Self::AssetLoad(msg.into())
    }

    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Catalog failures abort startup; everything else is local to one asset or surface.
    pub fn is_catalog(&self) -> bool {
        matches!(self, Self::CatalogEmpty { .. } | Self::CatalogRead { .. })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
