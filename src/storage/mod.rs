//! Blob storage for credentials and configuration.
//!
//! The CLI keeps its files on the local filesystem; the Lambda deployment keeps
//! them in S3. Both are addressed by a relative key.
//!
//! ```text
//! {root}/
//! ├── config.toml        # Sync configuration
//! └── .env/
//!     └── token.json     # Authorized-user token (refreshed in place)
//! ```

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
#[cfg(feature = "s3")]
pub use s3::S3Storage;

/// Trait for key/value blob backends.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob, returning None if it does not exist.
    async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Write (or replace) a blob.
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Human readable location of a key, for log messages.
    fn location(&self, key: &str) -> String;
}
