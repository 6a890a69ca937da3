//! Everything one page needs to address and refresh its widgets.

pub mod document;
pub mod onload;
pub mod refresh;

use std::sync::Arc;
use tracing::info;
use widgetlink_core::{Config, Error, Result};
use widgetlink_transport::{Fetcher, HttpAcquirer, TransportAcquirer};
use widgetlink_widget::{RootContext, WidgetNode};

pub use document::{Document, Element, MemoryDocument, MemoryElement};
pub use onload::{LoadCallback, PageBootstrap};
pub use refresh::{RefreshDispatcher, RefreshOutcome};

pub struct Page {
    root: Arc<WidgetNode>,
    fetcher: Fetcher,
    refresh: RefreshDispatcher,
    document: Arc<dyn Document>,
    bootstrap: PageBootstrap,
}

impl Page {
    pub fn new(
        context: Arc<RootContext>,
        acquirer: Arc<dyn TransportAcquirer>,
        document: Arc<dyn Document>,
        config: &Config,
    ) -> Self {
        let fetcher = Fetcher::new(acquirer);
        let refresh = RefreshDispatcher::new(
            fetcher.clone(),
            Arc::clone(&document),
            config.placeholders.clone(),
            config.refresh.nested_context_mode,
        );
        Self {
            root: WidgetNode::root(context),
            fetcher,
            refresh,
            document,
            bootstrap: PageBootstrap::new(),
        }
    }

    /// Builds a page for the configured location and session, using the
    /// HTTP transport.
    pub fn from_config(config: &Config, document: Arc<dyn Document>) -> Result<Self> {
        let location = config
            .page_location()
            .ok_or_else(|| Error::Config("page.location is not set".to_string()))?;
        let context = RootContext::from_location(location, config.page.session.clone());
        let acquirer = Arc::new(HttpAcquirer::new(&config.transport, context.base_uri()));
        info!(base_uri = %context.base_uri(), "Page initialized");
        Ok(Self::new(context, acquirer, document, config))
    }

    pub fn context(&self) -> &Arc<RootContext> {
        self.root.context()
    }

    pub fn root(&self) -> &Arc<WidgetNode> {
        &self.root
    }

    /// Finds a widget by its `/`-separated path below the root.
    pub fn widget(&self, path: &str) -> Option<Arc<WidgetNode>> {
        self.root.child(path)
    }

    /// Finds a widget, creating every missing level of `path` on the way.
    pub fn ensure_widget(&self, path: &str) -> Arc<WidgetNode> {
        self.root.ensure_descendant(path)
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    pub fn refresh(&self) -> &RefreshDispatcher {
        &self.refresh
    }

    pub fn document(&self) -> &Arc<dyn Document> {
        &self.document
    }

    /// Queues `callback` for the load event. Callbacks registered while
    /// the load callbacks run are still run; after that this returns
    /// `false` and drops the callback.
    pub fn register_onload(&self, callback: impl FnOnce() + Send + 'static) -> bool {
        self.bootstrap.register_onload(callback)
    }

    /// Delivers the host's load event. Only the first call runs callbacks.
    pub fn fire_load(&self) -> usize {
        self.bootstrap.fire_load()
    }

    pub fn is_loaded(&self) -> bool {
        self.bootstrap.is_loaded()
    }
}
