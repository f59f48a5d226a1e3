//! libcurl-backed transfer: one OS thread per download.
//!
//! Bytes go to `<path>.<ticket>.part` and are renamed into place only after a
//! complete, successful response, so a final file on disk always means finished
//! data. A worker only ever touches its own temp file: a canceled worker that is
//! still winding down cannot clobber a restarted transfer for the same path.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::config::CurlConfig;

use super::{Transfer, TransferError, TransferEvents, TransferHandle, TransferRequest};

/// Temporary file suffix used before atomic rename.
const TEMP_SUFFIX: &str = ".part";

/// Progress is reported in steps of this size to keep notification volume bounded.
const PROGRESS_STEP: f64 = 0.001;

/// Path for the temp file of transfer `ticket`: appends `.<ticket>.part` to the final path.
fn temp_path(final_path: &Path, ticket: u64) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(format!(".{ticket}{TEMP_SUFFIX}"));
    PathBuf::from(o)
}

/// Starts HTTP(S)/file downloads with libcurl's easy interface.
#[derive(Debug, Clone, Default)]
pub struct CurlTransfer {
    config: CurlConfig,
}

impl CurlTransfer {
    pub fn new(config: CurlConfig) -> Self {
        Self { config }
    }
}

/// Cancels a `CurlTransfer` by raising its abort token; the worker notices on
/// the next libcurl progress callback.
#[derive(Debug, Clone)]
pub struct CurlHandle {
    abort: Arc<AtomicBool>,
}

impl TransferHandle for CurlHandle {
    fn cancel(&self) {
        self.abort.store(true, Ordering::Relaxed);
    }
}

impl Transfer for CurlTransfer {
    fn begin(
        &self,
        request: TransferRequest,
        events: TransferEvents,
    ) -> Result<Box<dyn TransferHandle>, TransferError> {
        let abort = Arc::new(AtomicBool::new(false));
        let worker_abort = Arc::clone(&abort);
        let config = self.config.clone();

        thread::Builder::new()
            .name("dlc-transfer".to_string())
            .spawn(move || {
                let tmp = temp_path(&request.path, request.ticket);
                let result = download(&request, &tmp, &config, &worker_abort, &events);
                match &result {
                    Ok(bytes) => {
                        tracing::info!(path = %request.path.display(), bytes, "transfer finished");
                    }
                    Err(e) => {
                        let _ = fs::remove_file(&tmp);
                        if worker_abort.load(Ordering::Relaxed) {
                            tracing::info!(path = %request.path.display(), "transfer canceled");
                        } else {
                            tracing::warn!(url = %request.source, "transfer failed: {:#}", e);
                        }
                    }
                }
                events.complete(result.is_ok());
            })
            .map_err(TransferError::Spawn)?;

        Ok(Box::new(CurlHandle { abort }))
    }
}

/// Runs the download to completion on the current thread. Returns bytes written.
fn download(
    request: &TransferRequest,
    tmp: &Path,
    config: &CurlConfig,
    abort: &AtomicBool,
    events: &TransferEvents,
) -> Result<u64> {
    if let Some(parent) = request.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let mut file = File::create(tmp).with_context(|| format!("create {}", tmp.display()))?;
    let mut written: u64 = 0;
    let mut write_error: Option<std::io::Error> = None;
    let mut last_reported = -1.0_f64;

    let mut easy = curl::easy::Easy::new();
    easy.url(request.source.as_str()).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(config.max_redirections)?;
    easy.connect_timeout(Duration::from_secs(config.connect_timeout_secs))?;
    easy.low_speed_limit(config.low_speed_limit)?;
    easy.low_speed_time(Duration::from_secs(config.low_speed_time_secs))?;
    if let Some(ua) = &config.user_agent {
        easy.useragent(ua)?;
    }
    easy.progress(true)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.progress_function(|dl_total, dl_now, _, _| {
            if abort.load(Ordering::Relaxed) {
                return false;
            }
            if dl_total > 0.0 {
                let fraction = (dl_now / dl_total).clamp(0.0, 1.0);
                if fraction - last_reported >= PROGRESS_STEP || (fraction >= 1.0 && last_reported < 1.0) {
                    last_reported = fraction;
                    events.progress(fraction);
                }
            }
            true
        })?;
        transfer.perform()
    };
    if let Some(e) = write_error.take() {
        return Err(e).with_context(|| format!("write {}", tmp.display()));
    }
    performed.context("GET request failed")?;
    if abort.load(Ordering::Relaxed) {
        anyhow::bail!("canceled after the response completed");
    }

    if matches!(request.source.scheme(), "http" | "https") {
        let code = easy.response_code().context("no response code")?;
        if !(200..300).contains(&code) {
            anyhow::bail!("GET {} returned HTTP {}", request.source, code);
        }
    }

    file.sync_all().with_context(|| format!("sync {}", tmp.display()))?;
    drop(file);
    fs::rename(tmp, &request.path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), request.path.display()))?;
    Ok(written)
}
