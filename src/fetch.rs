//! Chunked, resumable download of the raw corpus with a byte ceiling.
//!
//! The fetcher never re-requests bytes already on disk: a partial file leads
//! to a `Range` request starting at the current local length, and streamed
//! chunks are appended until the ceiling is reached or the body ends. A
//! transport failure leaves whatever was written in place so the next run can
//! resume from it.

use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::FetchConfig;
use crate::error::{DbpeError, Result};

/// Progress snapshot emitted after each chunk is appended to disk.
#[derive(Debug, Clone, Copy)]
pub struct FetchProgress {
    /// Bytes present locally, including any earlier partial download.
    pub bytes_on_disk: u64,
    /// Total resource size implied by the response headers, when known.
    pub expected_total: Option<u64>,
}

impl FetchProgress {
    /// Completion percentage when the server reported a total size.
    #[must_use]
    pub fn percent(&self) -> Option<f64> {
        self.expected_total
            .filter(|&total| total > 0)
            .map(|total| (self.bytes_on_disk as f64 / total as f64) * 100.0)
    }
}

/// Result of a [`fetch_corpus`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The local file already met the byte ceiling; no request was made.
    AlreadyComplete,
    /// Bytes were appended until the ceiling or the end of the stream.
    Fetched {
        /// Number of bytes appended by this call.
        appended: u64,
    },
}

/// Ensures `dest` contains up to `cfg.max_bytes` bytes of the resource at `url`.
///
/// `on_progress` is called after every written chunk; it is informational and
/// has no effect on the transfer.
pub fn fetch_corpus<P, F>(
    url: &str,
    dest: P,
    cfg: &FetchConfig,
    mut on_progress: F,
) -> Result<FetchOutcome>
where
    P: AsRef<Path>,
    F: FnMut(FetchProgress),
{
    let dest = dest.as_ref();
    let existing = fs::metadata(dest).map(|meta| meta.len()).unwrap_or(0);
    if existing >= cfg.max_bytes {
        debug!(
            "local corpus {} already holds {existing} bytes (ceiling {}); skipping download",
            dest.display(),
            cfg.max_bytes
        );
        return Ok(FetchOutcome::AlreadyComplete);
    }

    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| DbpeError::io(err, Some(parent.to_path_buf())))?;
        }
    }

    let mut request = ureq::get(url).timeout(Duration::from_secs(cfg.timeout_secs));
    if existing > 0 {
        request = request.set("Range", &format!("bytes={existing}-"));
        info!("resuming download of {url} from byte {existing}");
    } else {
        info!("starting download of {url}");
    }

    let response = request
        .call()
        .map_err(|err| DbpeError::transport(url, err))?;
    if existing > 0 && response.status() != 206 {
        warn!("server ignored the range request; appended bytes restart from offset 0");
    }
    let remaining_hint = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok());
    let expected_total = remaining_hint.map(|remaining| {
        if response.status() == 206 {
            existing + remaining
        } else {
            remaining
        }
    });

    let mut reader = response.into_reader();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dest)
        .map_err(|err| DbpeError::io(err, Some(dest.to_path_buf())))?;

    let mut buffer = vec![0u8; cfg.chunk_size];
    let mut bytes_on_disk = existing;
    let mut appended = 0u64;
    loop {
        let read = reader
            .read(&mut buffer)
            .map_err(|err| DbpeError::transport(url, err))?;
        if read == 0 {
            break;
        }
        file.write_all(&buffer[..read])
            .map_err(|err| DbpeError::io(err, Some(dest.to_path_buf())))?;
        bytes_on_disk += read as u64;
        appended += read as u64;
        on_progress(FetchProgress {
            bytes_on_disk,
            expected_total,
        });
        if bytes_on_disk >= cfg.max_bytes {
            debug!("byte ceiling {} reached; closing stream early", cfg.max_bytes);
            break;
        }
    }
    file.flush()
        .map_err(|err| DbpeError::io(err, Some(dest.to_path_buf())))?;

    info!(
        "fetched {appended} bytes into {} ({bytes_on_disk} on disk)",
        dest.display()
    );
    Ok(FetchOutcome::Fetched { appended })
}
