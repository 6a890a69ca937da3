use std::sync::Arc;
use tracing::{debug, warn};
use widgetlink_core::{Error, Mode, Result};
use widgetlink_widget::WidgetNode;

use crate::handle::{RequestHandle, StateChangeCallback};
use crate::{HttpRequest, Method, Transport, TransportAcquirer};

/// Mode of a GET when the caller does not pick one.
pub const DEFAULT_GET_MODE: Mode = Mode::Proxy;

/// GET/POST requests addressed to widgets.
///
/// With a callback the transfer runs on a spawned task and the handle is
/// returned right after the request was opened. Without one the transfer
/// completes before the handle is returned.
#[derive(Clone)]
pub struct Fetcher {
    acquirer: Arc<dyn TransportAcquirer>,
}

impl Fetcher {
    pub fn new(acquirer: Arc<dyn TransportAcquirer>) -> Self {
        Self { acquirer }
    }

    pub async fn get(
        &self,
        widget: &WidgetNode,
        relative: Option<&str>,
        on_state_change: Option<StateChangeCallback>,
        mode: Option<Mode>,
    ) -> Result<RequestHandle> {
        let url = widget.translate_uri(relative, mode.unwrap_or(DEFAULT_GET_MODE))?;
        let transport = self.acquire()?;
        let request = HttpRequest {
            method: Method::Get,
            url,
            headers: Vec::new(),
            body: None,
        };
        Ok(dispatch(transport, request, on_state_change).await)
    }

    /// POSTs `body` to the widget in proxy mode. A missing content type or
    /// body fails before any transport is acquired.
    pub async fn post(
        &self,
        widget: &WidgetNode,
        relative: Option<&str>,
        content_type: Option<&str>,
        body: Option<&str>,
        on_state_change: Option<StateChangeCallback>,
    ) -> Result<RequestHandle> {
        let (content_type, body) = match (content_type, body) {
            (Some(content_type), Some(body)) => (content_type, body),
            (None, _) => return Err(Error::Precondition("POST requires a content type".to_string())),
            (_, None) => return Err(Error::Precondition("POST requires a request body".to_string())),
        };

        let url = widget.translate_uri(relative, Mode::Proxy)?;
        let transport = self.acquire()?;
        let request = HttpRequest {
            method: Method::Post,
            url,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: Some(body.to_string()),
        };
        Ok(dispatch(transport, request, on_state_change).await)
    }

    fn acquire(&self) -> Result<Arc<dyn Transport>> {
        self.acquirer.acquire().ok_or_else(|| {
            warn!("No transport could be acquired");
            Error::TransportUnavailable("no request object available".to_string())
        })
    }
}

async fn dispatch(
    transport: Arc<dyn Transport>,
    request: HttpRequest,
    on_state_change: Option<StateChangeCallback>,
) -> RequestHandle {
    let handle = RequestHandle::new(request.method, request.url.clone(), on_state_change);
    handle.open();
    debug!(method = ?request.method, url = %request.url, background = handle.is_async(), "Widget request opened");

    if handle.is_async() {
        let running = handle.clone();
        let task = tokio::spawn(async move { run(transport, request, running).await });
        let watched = handle.clone();
        tokio::spawn(async move {
            if let Err(e) = task.await {
                warn!(url = %watched.url(), error = %e, "Widget request task died");
                watched.abandon(format!("Request task failed: {}", e));
            }
        });
    } else {
        run(transport, request, handle.clone()).await;
    }
    handle
}

async fn run(transport: Arc<dyn Transport>, request: HttpRequest, handle: RequestHandle) {
    match transport.execute(request).await {
        Ok(response) => {
            debug!(url = %handle.url(), status = response.status, "Widget request completed");
            handle.complete(response);
        }
        Err(e) => {
            debug!(url = %handle.url(), error = %e, "Widget request failed");
            handle.fail(e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::ReadyState;
    use crate::testing::{MockTransport, StaticAcquirer};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::HttpResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::Notify;
    use widgetlink_widget::RootContext;

    fn tree() -> Arc<WidgetNode> {
        let root = WidgetNode::root(RootContext::new("http://h/p", "S1"));
        root.create_child(Some("a")).create_child(Some("b"))
    }

    struct CountingAcquirer(AtomicUsize);

    impl TransportAcquirer for CountingAcquirer {
        fn acquire(&self) -> Option<Arc<dyn Transport>> {
            self.0.fetch_add(1, Ordering::SeqCst);
            None
        }
    }

    #[tokio::test]
    async fn test_sync_get_defaults_to_proxy() {
        let transport = MockTransport::ok(200, "<p>hi</p>");
        let fetcher = Fetcher::new(StaticAcquirer::new(transport.clone()));
        let widget = tree();

        let handle = fetcher.get(&widget, Some("x?y=1"), None, None).await.unwrap();
        assert!(handle.is_success());
        assert_eq!(handle.response_text(), "<p>hi</p>");
        assert_eq!(
            handle.url(),
            "http://h/p;session=S1&focus=a%2Fb&frame=a%2Fb&raw=1&path=x?y=1"
        );

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, Method::Get);
        assert!(sent[0].body.is_none());
    }

    #[tokio::test]
    async fn test_async_get_notifies_callback() {
        let transport = MockTransport::ok(200, "done");
        let fetcher = Fetcher::new(StaticAcquirer::new(transport));
        let widget = tree();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: StateChangeCallback = Arc::new(move |h: &RequestHandle| {
            sink.lock().unwrap().push(h.ready_state());
        });

        let handle = fetcher
            .get(&widget, None, Some(callback), Some(Mode::Frame))
            .await
            .unwrap();
        handle.wait().await;
        assert!(handle.is_success());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&ReadyState::Opened));
        assert_eq!(seen.last(), Some(&ReadyState::Done));
    }

    /// Holds every request until the gate is opened.
    struct GatedTransport {
        gate: Notify,
    }

    #[async_trait]
    impl Transport for GatedTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
            self.gate.notified().await;
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: "late".to_string(),
            })
        }
    }

    struct PanickingTransport;

    #[async_trait]
    impl Transport for PanickingTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse> {
            panic!("transport blew up");
        }
    }

    #[tokio::test]
    async fn test_async_get_returns_before_transfer() {
        let transport = Arc::new(GatedTransport { gate: Notify::new() });
        let fetcher = Fetcher::new(StaticAcquirer::new(transport.clone()));
        let callback: StateChangeCallback = Arc::new(|_: &RequestHandle| {});

        let handle = fetcher
            .get(&tree(), None, Some(callback), None)
            .await
            .unwrap();
        assert_eq!(handle.ready_state(), ReadyState::Opened);
        assert!(!handle.is_done());

        transport.gate.notify_one();
        handle.wait().await;
        assert!(handle.is_success());
        assert_eq!(handle.response_text(), "late");
    }

    #[tokio::test]
    async fn test_panicking_transport_still_finishes_handle() {
        let fetcher = Fetcher::new(StaticAcquirer::new(Arc::new(PanickingTransport)));
        let callback: StateChangeCallback = Arc::new(|_: &RequestHandle| {});

        let handle = fetcher
            .get(&tree(), None, Some(callback), None)
            .await
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle.wait())
            .await
            .expect("handle never finished");
        assert!(handle.is_done());
        assert!(!handle.is_success());
        assert_eq!(handle.status(), 0);
        assert!(handle.error().unwrap().contains("Request task failed"));
    }

    #[tokio::test]
    async fn test_transport_error_completes_handle() {
        let fetcher = Fetcher::new(StaticAcquirer::new(MockTransport::failing("refused")));
        let handle = fetcher.get(&tree(), None, None, None).await.unwrap();
        assert!(handle.is_done());
        assert!(!handle.is_success());
        assert!(handle.error().unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn test_unaddressable_widget() {
        let acquirer = Arc::new(CountingAcquirer(AtomicUsize::new(0)));
        let fetcher = Fetcher::new(acquirer.clone());
        let root = WidgetNode::root(RootContext::new("http://h/p", "S1"));
        let orphan = root.create_child(None).create_child(Some("x"));

        let result = fetcher.get(&orphan, None, None, None).await;
        assert!(matches!(result, Err(Error::Unaddressable(_))));
        assert_eq!(acquirer.0.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_transport() {
        let fetcher = Fetcher::new(Arc::new(CountingAcquirer(AtomicUsize::new(0))));
        let result = fetcher.get(&tree(), None, None, None).await;
        assert!(matches!(result, Err(Error::TransportUnavailable(_))));
    }

    #[tokio::test]
    async fn test_post_sets_content_type() {
        let transport = MockTransport::ok(201, "");
        let fetcher = Fetcher::new(StaticAcquirer::new(transport.clone()));
        let handle = fetcher
            .post(&tree(), Some("form"), Some("application/x-www-form-urlencoded"), Some("a=1"), None)
            .await
            .unwrap();
        assert!(handle.is_success());

        let sent = transport.requests();
        assert_eq!(sent[0].method, Method::Post);
        assert!(sent[0].url.contains("&raw=1&path=form"));
        assert_eq!(
            sent[0].headers,
            vec![(
                "Content-Type".to_string(),
                "application/x-www-form-urlencoded".to_string()
            )]
        );
        assert_eq!(sent[0].body.as_deref(), Some("a=1"));
    }

    #[tokio::test]
    async fn test_post_precondition_skips_transport() {
        let acquirer = Arc::new(CountingAcquirer(AtomicUsize::new(0)));
        let fetcher = Fetcher::new(acquirer.clone());
        let widget = tree();

        let missing_type = fetcher.post(&widget, Some("x"), None, Some("body"), None).await;
        assert!(matches!(missing_type, Err(Error::Precondition(_))));
        let missing_body = fetcher.post(&widget, Some("x"), Some("text/plain"), None, None).await;
        assert!(matches!(missing_body, Err(Error::Precondition(_))));
        assert_eq!(acquirer.0.load(Ordering::SeqCst), 0);
    }
}
