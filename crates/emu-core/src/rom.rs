//! Read-only ROM and font images.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::warn;
use thiserror::Error;

/// Failure to load a ROM or font image.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is empty")]
    Empty { path: PathBuf },
}

/// An immutable ROM image, cheap to clone and share between contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rom(Arc<[u8]>);

impl Rom {
    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ResourceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(ResourceError::Empty {
                path: path.to_path_buf(),
            });
        }
        Ok(Self(bytes.into()))
    }

    /// Load, logging and swallowing any failure. A missing image makes the
    /// corresponding window fall through to the next precedence level.
    #[must_use]
    pub fn load_optional(path: impl AsRef<Path>) -> Option<Self> {
        match Self::load(path) {
            Ok(rom) => Some(rom),
            Err(e) => {
                warn!("{e}");
                None
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Byte at `offset`, or `None` past the end of the image.
    #[must_use]
    pub fn get(&self, offset: usize) -> Option<u8> {
        self.0.get(offset).copied()
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_io_error() {
        let err = Rom::load("/nonexistent/z1013_202.bin");
        assert!(matches!(err, Err(ResourceError::Io { .. })));
        assert!(Rom::load_optional("/nonexistent/z1013_202.bin").is_none());
    }

    #[test]
    fn get_is_bounded() {
        let rom = Rom::from_bytes(&[1, 2, 3]);
        assert_eq!(rom.get(2), Some(3));
        assert_eq!(rom.get(3), None);
        assert_eq!(rom.len(), 3);
    }
}
