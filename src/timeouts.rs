//! Per-phase request deadlines.
//!
//! - **connect**: TCP connect plus TLS handshake.
//! - **ttfb**: request sent until response headers arrive.
//! - **total**: the whole request, body included.
//!
//! None of them reset. An expired deadline surfaces as the matching
//! [`Error`] variant and is never retried.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Timeout configuration. `None` disables a phase's deadline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Option<Duration>,
    pub ttfb: Option<Duration>,
    pub total: Option<Duration>,
}

impl Timeouts {
    /// No deadlines at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// connect 10s, ttfb 30s, total 30s.
    pub fn api_defaults() -> Self {
        Self {
            connect: Some(Duration::from_secs(10)),
            ttfb: Some(Duration::from_secs(30)),
            total: Some(Duration::from_secs(30)),
        }
    }

    pub fn connect(mut self, timeout: Duration) -> Self {
        self.connect = Some(timeout);
        self
    }

    pub fn ttfb(mut self, timeout: Duration) -> Self {
        self.ttfb = Some(timeout);
        self
    }

    pub fn total(mut self, timeout: Duration) -> Self {
        self.total = Some(timeout);
        self
    }

    pub fn no_connect_timeout(mut self) -> Self {
        self.connect = None;
        self
    }

    pub fn no_ttfb_timeout(mut self) -> Self {
        self.ttfb = None;
        self
    }

    pub fn no_total_timeout(mut self) -> Self {
        self.total = None;
        self
    }
}

/// Run `fut` under an optional deadline, mapping expiry with `on_expiry`.
pub(crate) async fn with_deadline<F, T>(
    deadline: Option<Duration>,
    on_expiry: fn(Duration) -> Error,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| on_expiry(limit))?,
        None => fut.await,
    }
}
