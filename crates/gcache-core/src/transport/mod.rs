//! Transfer queue boundary.
//!
//! The engine classifies entries and enqueues transfers, then blocks on one
//! "run everything queued" call. The transport decides how bytes actually
//! move; the engine only sees a success-or-first-failure result.

mod curl;

pub use self::curl::CurlTransport;

use anyhow::Result;
use std::path::PathBuf;

/// One queued transfer: a remote URL or `file://` source into a cache
/// destination.
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub source: String,
    pub destination: PathBuf,
    /// Expected byte size when the manifest knows it; checked after the
    /// transfer completes.
    pub expected_size: Option<u64>,
}

/// External transfer executor.
pub trait Transport {
    /// Queues a transfer without starting it.
    fn enqueue(&mut self, request: TransferRequest) -> Result<()>;

    /// Runs all queued transfers to completion; the first failure aborts the
    /// whole batch and leaves later transfers unexecuted.
    fn run_queued(&mut self) -> Result<()>;
}
