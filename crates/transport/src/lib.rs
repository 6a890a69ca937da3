//! Request transport for widget fetches.
//!
//! [`Transport`] performs one HTTP exchange; [`TransportAcquirer`] probes
//! whether one is available at all. [`Fetcher`] combines them with the
//! widget tree's URI translation.

pub mod client;
pub mod fetch;
pub mod handle;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use widgetlink_core::Result;

pub use client::{build_http_client, HttpAcquirer, HttpTransport};
pub use fetch::{Fetcher, DEFAULT_GET_MODE};
pub use handle::{ReadyState, RequestHandle, StateChangeCallback};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the exchange. Non-2xx statuses are responses, not errors.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Capability probe for a transport; `None` when the environment has none.
pub trait TransportAcquirer: Send + Sync {
    fn acquire(&self) -> Option<Arc<dyn Transport>>;
}

/// Tries several acquirers in order and uses the first transport found.
#[derive(Default)]
pub struct AcquirerChain {
    acquirers: Vec<Arc<dyn TransportAcquirer>>,
}

impl AcquirerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, acquirer: Arc<dyn TransportAcquirer>) -> Self {
        self.acquirers.push(acquirer);
        self
    }

    pub fn len(&self) -> usize {
        self.acquirers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.acquirers.is_empty()
    }
}

impl TransportAcquirer for AcquirerChain {
    fn acquire(&self) -> Option<Arc<dyn Transport>> {
        for (index, acquirer) in self.acquirers.iter().enumerate() {
            if let Some(transport) = acquirer.acquire() {
                debug!(index, "Transport acquired");
                return Some(transport);
            }
        }
        None
    }
}
