//! Transferer interface: stream a media URL to a local path.

mod curl_get;

pub use curl_get::CurlTransferer;

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Failure of a single media transfer.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("GET {url} failed: {source}")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
    #[error("storage: {0}")]
    Storage(String),
    #[error("transfer task failed: {0}")]
    Task(String),
}

/// Streams `url` to `dest`, creating intermediate directories.
/// Returns the number of bytes written.
#[async_trait]
pub trait Transferer: Send + Sync {
    async fn transfer(&self, url: &str, dest: &Path) -> Result<u64, TransferError>;
}
