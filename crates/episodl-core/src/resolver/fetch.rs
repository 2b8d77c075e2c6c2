//! Blocking text GET used by the bundled resolvers.
//!
//! Runs in the current thread; call from `spawn_blocking` if used from async code.

use std::str;
use std::time::Duration;

use super::ResolveError;

/// Pages and manifests larger than this are rejected.
pub(crate) const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone)]
pub(crate) struct FetchOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

/// GETs `url` following redirects and returns the body as (lossy) UTF-8.
pub(crate) fn get_text(url: &str, opts: &FetchOptions) -> Result<String, ResolveError> {
    let fetch_err = |source: curl::Error| {
        if source.is_operation_timedout() {
            ResolveError::Timeout {
                url: url.to_string(),
                secs: opts.timeout.as_secs(),
            }
        } else {
            ResolveError::Fetch {
                url: url.to_string(),
                source,
            }
        }
    };

    let mut body: Vec<u8> = Vec::new();
    let mut too_large = false;

    let mut easy = curl::easy::Easy::new();
    easy.url(url).map_err(fetch_err)?;
    easy.follow_location(true).map_err(fetch_err)?;
    easy.max_redirections(10).map_err(fetch_err)?;
    easy.useragent(&opts.user_agent).map_err(fetch_err)?;
    easy.accept_encoding("").map_err(fetch_err)?;
    easy.connect_timeout(opts.timeout.min(Duration::from_secs(15)))
        .map_err(fetch_err)?;
    easy.timeout(opts.timeout).map_err(fetch_err)?;

    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                if body.len() + data.len() > MAX_BODY_BYTES {
                    too_large = true;
                    return Ok(0); // abort transfer
                }
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(fetch_err)?;
        let performed = transfer.perform();
        drop(transfer);
        if too_large {
            return Err(ResolveError::BodyTooLarge {
                url: url.to_string(),
                limit: MAX_BODY_BYTES,
            });
        }
        performed.map_err(fetch_err)?;
    }

    let code = easy.response_code().map_err(fetch_err)?;
    if !(200..300).contains(&code) {
        return Err(ResolveError::Http {
            url: url.to_string(),
            code,
        });
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
