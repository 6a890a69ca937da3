use std::sync::Arc;
use tracing::{debug, info};
use widgetlink_core::config::PlaceholderConfig;
use widgetlink_core::{Mode, Result};
use widgetlink_transport::{Fetcher, RequestHandle, StateChangeCallback};
use widgetlink_widget::WidgetNode;

use crate::document::Document;

/// How a refresh was carried out.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// A nested browsing context was pointed at `uri`; it loads on its own.
    Navigated { element_id: String, uri: String },
    /// A frame-mode GET is in flight; its content replaces the widget's
    /// placeholder once it completes with a 2xx status.
    Inline(RequestHandle),
}

impl RefreshOutcome {
    pub fn handle(&self) -> Option<&RequestHandle> {
        match self {
            RefreshOutcome::Inline(handle) => Some(handle),
            RefreshOutcome::Navigated { .. } => None,
        }
    }
}

/// Reloads single widgets in place.
pub struct RefreshDispatcher {
    fetcher: Fetcher,
    document: Arc<dyn Document>,
    placeholders: PlaceholderConfig,
    nested_context_mode: Mode,
}

impl RefreshDispatcher {
    pub fn new(
        fetcher: Fetcher,
        document: Arc<dyn Document>,
        placeholders: PlaceholderConfig,
        nested_context_mode: Mode,
    ) -> Self {
        Self {
            fetcher,
            document,
            placeholders,
            nested_context_mode,
        }
    }

    /// Reloads `widget` from `uri` (relative to the widget).
    ///
    /// If the document hosts the widget in a nested browsing context, that
    /// context is navigated and no request is issued here. Otherwise the
    /// widget is fetched in frame mode and swapped into its content element.
    /// Failed fetches leave the document untouched.
    pub async fn reload(&self, widget: &WidgetNode, uri: Option<&str>) -> Result<RefreshOutcome> {
        let (Some(nested_id), Some(content_id)) = (
            widget.nested_context_element_id(&self.placeholders),
            widget.content_element_id(&self.placeholders),
        ) else {
            return Err(widget.unaddressable_error());
        };

        if let Some(nested) = self.document.element_by_id(&nested_id) {
            let target = widget.translate_uri(uri, self.nested_context_mode)?;
            nested.set_navigation_target(&target);
            info!(element = %nested_id, uri = %target, "Widget reloaded in nested context");
            return Ok(RefreshOutcome::Navigated {
                element_id: nested_id,
                uri: target,
            });
        }

        let document = Arc::clone(&self.document);
        let callback: StateChangeCallback = Arc::new(move |handle: &RequestHandle| {
            if !handle.is_done() {
                return;
            }
            if !handle.is_success() {
                debug!(status = handle.status(), error = ?handle.error(), "Widget reload failed");
                return;
            }
            match document.element_by_id(&content_id) {
                Some(element) => {
                    element.set_content(&handle.response_text());
                    debug!(element = %content_id, "Widget content replaced");
                }
                None => debug!(element = %content_id, "Widget content element missing"),
            }
        });

        let handle = self
            .fetcher
            .get(widget, uri, Some(callback), Some(Mode::Frame))
            .await?;
        Ok(RefreshOutcome::Inline(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use widgetlink_core::Error;
    use widgetlink_transport::testing::{MockTransport, StaticAcquirer};
    use widgetlink_widget::RootContext;

    struct Fixture {
        root: Arc<WidgetNode>,
        document: Arc<MemoryDocument>,
        transport: Arc<MockTransport>,
    }

    impl Fixture {
        fn new(transport: Arc<MockTransport>) -> Self {
            let root = WidgetNode::root(RootContext::new("http://h/p", "S1"));
            root.create_child(Some("a")).create_child(Some("b"));
            Self {
                root,
                document: Arc::new(MemoryDocument::new()),
                transport,
            }
        }

        fn dispatcher(&self, nested_context_mode: Mode) -> RefreshDispatcher {
            RefreshDispatcher::new(
                Fetcher::new(StaticAcquirer::new(self.transport.clone())),
                self.document.clone(),
                PlaceholderConfig::default(),
                nested_context_mode,
            )
        }

        fn widget(&self) -> Arc<WidgetNode> {
            self.root.child("a/b").unwrap()
        }
    }

    #[tokio::test]
    async fn test_inline_refresh_replaces_content() {
        let fx = Fixture::new(MockTransport::ok(200, "<b>fresh</b>"));
        let element = fx.document.insert("beng_widget___a__b__", "stale");

        let outcome = fx.dispatcher(Mode::Frame).reload(&fx.widget(), Some("x")).await.unwrap();
        outcome.handle().unwrap().wait().await;

        assert_eq!(element.content(), "<b>fresh</b>");
        let sent = fx.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].url,
            "http://h/p;session=S1&focus=a%2Fb&frame=a%2Fb&path=x"
        );
    }

    #[tokio::test]
    async fn test_inline_refresh_failure_leaves_content() {
        let fx = Fixture::new(MockTransport::ok(500, "error page"));
        let element = fx.document.insert("beng_widget___a__b__", "stale");

        let outcome = fx.dispatcher(Mode::Frame).reload(&fx.widget(), None).await.unwrap();
        let handle = outcome.handle().unwrap();
        handle.wait().await;

        assert!(handle.is_done());
        assert_eq!(element.content(), "stale");
    }

    #[tokio::test]
    async fn test_inline_refresh_transport_error_leaves_content() {
        let fx = Fixture::new(MockTransport::failing("reset"));
        let element = fx.document.insert("beng_widget___a__b__", "stale");

        let outcome = fx.dispatcher(Mode::Frame).reload(&fx.widget(), None).await.unwrap();
        outcome.handle().unwrap().wait().await;
        assert_eq!(element.content(), "stale");
    }

    #[tokio::test]
    async fn test_inline_refresh_without_content_element() {
        let fx = Fixture::new(MockTransport::ok(200, "ignored"));
        let outcome = fx.dispatcher(Mode::Frame).reload(&fx.widget(), None).await.unwrap();
        let handle = outcome.handle().unwrap();
        handle.wait().await;
        assert!(handle.is_success());
        assert!(fx.document.ids().is_empty());
    }

    #[tokio::test]
    async fn test_nested_context_is_navigated() {
        let fx = Fixture::new(MockTransport::ok(200, "unused"));
        let frame = fx.document.insert("beng_iframe___a__b__", "");
        let content = fx.document.insert("beng_widget___a__b__", "stale");

        let outcome = fx.dispatcher(Mode::Frame).reload(&fx.widget(), Some("y")).await.unwrap();
        assert!(outcome.handle().is_none());
        let expected = "http://h/p;session=S1&focus=a%2Fb&frame=a%2Fb&path=y";
        assert_eq!(frame.navigation_target().as_deref(), Some(expected));
        match outcome {
            RefreshOutcome::Navigated { element_id, uri } => {
                assert_eq!(element_id, "beng_iframe___a__b__");
                assert_eq!(uri, expected);
            }
            RefreshOutcome::Inline(_) => panic!("expected navigation"),
        }
        assert!(fx.transport.requests().is_empty());
        assert_eq!(content.content(), "stale");
    }

    #[tokio::test]
    async fn test_nested_context_focus_only_mode() {
        let fx = Fixture::new(MockTransport::ok(200, "unused"));
        let frame = fx.document.insert("beng_iframe___a__b__", "");

        fx.dispatcher(Mode::Focus).reload(&fx.widget(), Some("y")).await.unwrap();
        assert_eq!(
            frame.navigation_target().as_deref(),
            Some("http://h/p;session=S1&focus=a%2Fb&path=y")
        );
    }

    #[tokio::test]
    async fn test_unaddressable_widget() {
        let fx = Fixture::new(MockTransport::ok(200, "unused"));
        let orphan = fx.root.create_child(None);
        let result = fx.dispatcher(Mode::Frame).reload(&orphan, None).await;
        assert!(matches!(result, Err(Error::Unaddressable(_))));
        assert!(fx.transport.requests().is_empty());
    }
}
