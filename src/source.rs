use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::{error::Result, types::FileListing};

/// Chunked body of a fetched file
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Core abstraction over the upstream repository
///
/// The gateway only ever talks to a source through this trait, so the
/// HTTP client behind it can be swapped for an in-memory one in tests.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the current listing, in upstream order
    async fn list_files(&self) -> Result<FileListing>;

    /// Open the raw content behind a descriptor's download URL
    async fn open_file(&self, download_url: &str) -> Result<ByteStream>;

    /// Get a human-readable identifier for this source (for logging/debugging)
    fn identifier(&self) -> String;
}
