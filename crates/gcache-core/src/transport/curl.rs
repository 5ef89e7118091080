//! Sequential curl-based transport.
//!
//! Downloads are written to a `.part` temp file and renamed into place once
//! complete, so a crashed transfer never leaves a plausible-looking cache
//! file behind. `file://` sources are plain filesystem copies.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use super::{TransferRequest, Transport};

/// Path for the in-progress file: appends `.part` to the destination.
fn temp_path(destination: &Path) -> PathBuf {
    let mut o = destination.as_os_str().to_owned();
    o.push(".part");
    PathBuf::from(o)
}

/// Transport that performs queued transfers one at a time with curl.
#[derive(Default)]
pub struct CurlTransport {
    queue: Vec<TransferRequest>,
}

impl CurlTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Transport for CurlTransport {
    fn enqueue(&mut self, request: TransferRequest) -> Result<()> {
        tracing::debug!(
            "queued transfer {} -> {}",
            request.source,
            request.destination.display()
        );
        self.queue.push(request);
        Ok(())
    }

    fn run_queued(&mut self) -> Result<()> {
        let queue = std::mem::take(&mut self.queue);
        tracing::info!("running {} queued transfer(s)", queue.len());
        for request in &queue {
            run_one(request)
                .with_context(|| format!("transfer of {} failed", request.source))?;
        }
        Ok(())
    }
}

fn run_one(request: &TransferRequest) -> Result<()> {
    if let Some(parent) = request.destination.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }

    let url = Url::parse(&request.source)
        .with_context(|| format!("invalid source URL {}", request.source))?;
    if url.scheme() == "file" {
        return copy_local(&url, request);
    }
    download_http(request)
}

fn copy_local(url: &Url, request: &TransferRequest) -> Result<()> {
    let source = url
        .to_file_path()
        .map_err(|_| anyhow::anyhow!("unusable file URL {}", request.source))?;
    let copied = fs::copy(&source, &request.destination).with_context(|| {
        format!(
            "copy {} -> {}",
            source.display(),
            request.destination.display()
        )
    })?;
    if let Some(expected) = request.expected_size {
        if copied != expected {
            anyhow::bail!("copied {} of {} expected bytes", copied, expected);
        }
    }
    Ok(())
}

fn download_http(request: &TransferRequest) -> Result<()> {
    let temp = temp_path(&request.destination);
    let file = File::create(&temp)
        .with_context(|| format!("create {}", temp.display()))?;
    let mut out = BufWriter::new(file);
    let mut written: u64 = 0;

    let mut easy = curl::easy::Easy::new();
    easy.url(&request.source).context("invalid URL")?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(30))?;
    // Prefer a low-speed timeout: abort if throughput drops below 1 KiB/s for
    // 60s, with a hard wall-clock limit as the safety net.
    easy.low_speed_limit(1024)?;
    easy.low_speed_time(Duration::from_secs(60))?;
    easy.timeout(Duration::from_secs(3600))?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            match out.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    tracing::warn!("write to {} failed: {}", temp.display(), e);
                    Ok(0) // abort transfer
                }
            }
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        let _ = fs::remove_file(&temp);
        anyhow::bail!("GET {} returned HTTP {}", request.source, code);
    }

    let file = out
        .into_inner()
        .context("flush downloaded bytes")?;
    file.sync_all().context("sync downloaded file")?;
    drop(file);

    if let Some(expected) = request.expected_size {
        if written != expected {
            let _ = fs::remove_file(&temp);
            anyhow::bail!("partial transfer: wrote {} of {}", written, expected);
        }
    }

    fs::rename(&temp, &request.destination).with_context(|| {
        format!(
            "rename {} -> {}",
            temp.display(),
            request.destination.display()
        )
    })?;
    Ok(())
}
