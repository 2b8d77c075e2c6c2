//! Single-stream HTTP GET transferer (libcurl).
//!
//! Writes the response body sequentially into `<dest>.part` and renames it on
//! success. Any failure removes the partial file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::TransferConfig;
use crate::storage::PartFile;

use super::{TransferError, Transferer};

/// [`Transferer`] running one blocking curl GET per call on the blocking pool.
#[derive(Debug, Clone)]
pub struct CurlTransferer {
    cfg: TransferConfig,
}

impl CurlTransferer {
    pub fn new(cfg: TransferConfig) -> Self {
        Self { cfg }
    }
}

fn storage_err(e: anyhow::Error) -> TransferError {
    TransferError::Storage(format!("{:#}", e))
}

fn get_into(url: &str, part: &mut PartFile, cfg: &TransferConfig) -> Result<(), TransferError> {
    let curl_err = |source: curl::Error| TransferError::Curl {
        url: url.to_string(),
        source,
    };
    let mut write_error: Option<anyhow::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(curl_err)?;
    easy.follow_location(true).map_err(curl_err)?;
    easy.max_redirections(10).map_err(curl_err)?;
    easy.connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .map_err(curl_err)?;
    easy.low_speed_limit(cfg.low_speed_limit_bytes)
        .map_err(curl_err)?;
    easy.low_speed_time(Duration::from_secs(cfg.low_speed_time_secs))
        .map_err(curl_err)?;
    easy.timeout(Duration::from_secs(cfg.timeout_secs))
        .map_err(curl_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| match part.append(data) {
                Ok(()) => Ok(data.len()),
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })
            .map_err(curl_err)?;
        let performed = transfer.perform();
        drop(transfer);
        if let Some(e) = write_error.take() {
            return Err(storage_err(e));
        }
        performed.map_err(curl_err)?;
    }

    let code = easy.response_code().map_err(curl_err)?;
    if !(200..300).contains(&code) {
        return Err(TransferError::Http {
            url: url.to_string(),
            code,
        });
    }
    Ok(())
}

fn transfer_blocking(url: &str, dest: &Path, cfg: &TransferConfig) -> Result<u64, TransferError> {
    let mut part = PartFile::create(dest).map_err(storage_err)?;
    match get_into(url, &mut part, cfg) {
        Ok(()) => part.finalize().map_err(storage_err),
        Err(e) => {
            part.discard();
            Err(e)
        }
    }
}

#[async_trait]
impl Transferer for CurlTransferer {
    async fn transfer(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        let url_owned = url.to_string();
        let dest_owned: PathBuf = dest.to_path_buf();
        let cfg = self.cfg.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            transfer_blocking(&url_owned, &dest_owned, &cfg)
        })
        .await
        .map_err(|e| TransferError::Task(e.to_string()))??;
        tracing::debug!(url, dest = %dest.display(), bytes, "transfer finished");
        Ok(bytes)
    }
}
