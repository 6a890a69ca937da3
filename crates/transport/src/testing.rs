//! In-memory transports for tests of code built on [`Fetcher`](crate::Fetcher).

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use widgetlink_core::{Error, Result};

use crate::{HttpRequest, HttpResponse, Transport, TransportAcquirer};

/// Answers every request with the same response and records what was sent.
pub struct MockTransport {
    response: std::result::Result<HttpResponse, String>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn ok(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(error: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Err(error.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request);
        self.response.clone().map_err(Error::Transport)
    }
}

/// Always hands out the same transport.
pub struct StaticAcquirer(Arc<dyn Transport>);

impl StaticAcquirer {
    pub fn new(transport: Arc<dyn Transport>) -> Arc<Self> {
        Arc::new(Self(transport))
    }
}

impl TransportAcquirer for StaticAcquirer {
    fn acquire(&self) -> Option<Arc<dyn Transport>> {
        Some(Arc::clone(&self.0))
    }
}

/// Never finds a transport.
pub struct NoTransport;

impl TransportAcquirer for NoTransport {
    fn acquire(&self) -> Option<Arc<dyn Transport>> {
        None
    }
}
