//! The client-side mirror of the server's widget composition.
//!
//! A page owns one [`RootContext`] and one root [`WidgetNode`]. Every other
//! node is created top-down through [`WidgetNode::create_child`], which
//! freezes its slash-separated path at construction.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use tracing::{debug, warn};
use widgetlink_core::config::PlaceholderConfig;
use widgetlink_core::{Error, Mode, Result};

use crate::placeholder::{element_id, PlaceholderKind};
use crate::uri::{base_uri_of, widget_uri, UriRequest};

/// Base URI and session token shared by every widget of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootContext {
    base_uri: String,
    session: String,
}

impl RootContext {
    pub fn new(base_uri: impl Into<String>, session: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            base_uri: base_uri.into(),
            session: session.into(),
        })
    }

    /// Derives the base URI from the current document location.
    pub fn from_location(location: &str, session: impl Into<String>) -> Arc<Self> {
        Self::new(base_uri_of(location), session)
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn make_uri(&self, request: &UriRequest<'_>) -> Option<String> {
        widget_uri(&self.base_uri, &self.session, request)
    }
}

/// One addressable widget instance.
#[derive(Debug)]
pub struct WidgetNode {
    id: Option<String>,
    path: Option<String>,
    parent: Option<Weak<WidgetNode>>,
    context: Arc<RootContext>,
    children: RwLock<HashMap<String, Arc<WidgetNode>>>,
}

impl WidgetNode {
    /// The root of a page's widget tree. It has no id, no parent and no path.
    pub fn root(context: Arc<RootContext>) -> Arc<Self> {
        Arc::new(Self {
            id: None,
            path: None,
            parent: None,
            context,
            children: RwLock::new(HashMap::new()),
        })
    }

    /// Creates a child of this node.
    ///
    /// Children of the root take their id as path; deeper children append
    /// `/id` to the parent's path. A node below an unaddressable parent, or
    /// one without an id, has no path. Only children with an id are
    /// registered for lookup; an existing child with the same id is replaced.
    pub fn create_child(self: &Arc<Self>, id: Option<&str>) -> Arc<Self> {
        let path = match (id, self.parent.is_none(), self.path.as_deref()) {
            (None, _, _) => None,
            (Some(id), true, _) => Some(id.to_string()),
            (Some(_), false, None) => None,
            (Some(id), false, Some(parent_path)) => Some(format!("{}/{}", parent_path, id)),
        };

        let child = Arc::new(Self {
            id: id.map(str::to_string),
            path,
            parent: Some(Arc::downgrade(self)),
            context: Arc::clone(&self.context),
            children: RwLock::new(HashMap::new()),
        });

        if let Some(id) = id {
            let previous = self
                .children
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id.to_string(), Arc::clone(&child));
            if previous.is_some() {
                warn!(id = %id, parent = ?self.path, "Replacing existing widget with the same id");
            }
        }

        debug!(id = ?child.id, path = ?child.path, "Widget created");
        child
    }

    /// Looks up a descendant by a `/`-separated id path. A miss at any level
    /// yields `None`.
    pub fn child(&self, id: &str) -> Option<Arc<Self>> {
        let (head, rest) = match id.split_once('/') {
            Some((head, rest)) => (head, Some(rest)),
            None => (id, None),
        };

        let child = self
            .children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(head)
            .cloned()?;

        match rest {
            Some(rest) => child.child(rest),
            None => Some(child),
        }
    }

    /// Finds the descendant at `path`, creating every missing level.
    pub fn ensure_descendant(self: &Arc<Self>, path: &str) -> Arc<Self> {
        let mut node = Arc::clone(self);
        for segment in path.split('/') {
            node = match node.child(segment) {
                Some(existing) => existing,
                None => node.create_child(Some(segment)),
            };
        }
        node
    }

    /// Ids of the registered children, sorted.
    pub fn child_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The containing node, if it is still alive.
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    pub fn context(&self) -> &Arc<RootContext> {
        &self.context
    }

    /// The request URI for `relative` inside this widget.
    pub fn translate_uri(&self, relative: Option<&str>, mode: Mode) -> Result<String> {
        self.translate_uri_framed(relative, mode, None)
    }

    /// Like [`translate_uri`](Self::translate_uri), with an explicit frame
    /// target for modes that do not frame the focused widget themselves.
    pub fn translate_uri_framed(
        &self,
        relative: Option<&str>,
        mode: Mode,
        frame: Option<&str>,
    ) -> Result<String> {
        let request = UriRequest::new(self.path(), relative, mode).with_frame(frame);
        self.context
            .make_uri(&request)
            .ok_or_else(|| self.unaddressable_error())
    }

    /// Id of the element that receives this widget's content.
    pub fn content_element_id(&self, placeholders: &PlaceholderConfig) -> Option<String> {
        self.path()
            .map(|path| element_id(placeholders, PlaceholderKind::Content, path))
    }

    /// Id of the nested browsing context hosting this widget, if any.
    pub fn nested_context_element_id(&self, placeholders: &PlaceholderConfig) -> Option<String> {
        self.path()
            .map(|path| element_id(placeholders, PlaceholderKind::NestedContext, path))
    }

    /// The error reported for requests addressed to this node while it has
    /// no path.
    pub fn unaddressable_error(&self) -> Error {
        Error::Unaddressable(self.id.clone().unwrap_or_else(|| "<anonymous>".to_string()))
    }
}
