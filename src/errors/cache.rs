//! Error types for the block cache and its snapshot file.
//!
//! Snapshot errors are soft at the pipeline level: the analyzer logs them and
//! starts from an empty cache. They are still typed so callers and tests can
//! tell a missing file from a corrupt one.

/// Errors that can occur while constructing the block cache or reading and
/// writing its snapshot.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache was constructed with a capacity of zero.
    #[error("Cache capacity must be greater than zero")]
    InvalidCapacity,

    /// Filesystem error on the snapshot file.
    #[error("Snapshot I/O error at {path}: {details}")]
    Io {
        /// Path to the snapshot file
        path: String,
        /// Details about the I/O error
        details: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be encoded or decoded.
    #[error("Snapshot serialization error: {details}")]
    Serialization {
        /// Details about the serialization error
        details: String,
        /// The underlying bincode error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The snapshot was written by an incompatible build.
    #[error("Snapshot version {found} is not supported (expected {expected})")]
    VersionMismatch {
        /// Version found in the file
        found: u32,
        /// Version this build writes
        expected: u32,
    },
}

impl CacheError {
    /// Create an `Io` error for a snapshot path.
    pub fn io(
        path: impl Into<String>,
        details: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        CacheError::Io {
            path: path.into(),
            details: details.into(),
            source,
        }
    }

    /// Create a `Serialization` error from any encoding error.
    pub fn serialization(
        details: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        CacheError::Serialization {
            details: details.into(),
            source: Box::new(source),
        }
    }

    /// True when the snapshot file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CacheError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
