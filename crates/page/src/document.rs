//! The host document, as far as widget refreshes need it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// An element a refresh can write to.
pub trait Element: Send + Sync {
    /// Replaces the element's content (inline refresh).
    fn set_content(&self, html: &str);
    /// Points a nested browsing context at `uri`.
    fn set_navigation_target(&self, uri: &str);
}

pub trait Document: Send + Sync {
    fn element_by_id(&self, id: &str) -> Option<Arc<dyn Element>>;
}

#[derive(Debug, Default)]
pub struct MemoryElement {
    content: Mutex<String>,
    navigation_target: Mutex<Option<String>>,
}

impl MemoryElement {
    pub fn new(content: &str) -> Self {
        Self {
            content: Mutex::new(content.to_string()),
            navigation_target: Mutex::new(None),
        }
    }

    pub fn content(&self) -> String {
        self.content.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn navigation_target(&self) -> Option<String> {
        self.navigation_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Element for MemoryElement {
    fn set_content(&self, html: &str) {
        *self.content.lock().unwrap_or_else(PoisonError::into_inner) = html.to_string();
    }

    fn set_navigation_target(&self, uri: &str) {
        *self
            .navigation_target
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(uri.to_string());
    }
}

/// A document held in memory, keyed by element id.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: RwLock<HashMap<String, Arc<MemoryElement>>>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every element with an `id` from server-rendered markup.
    /// Content is the element's inner HTML; a `src` attribute becomes the
    /// navigation target.
    pub fn from_html(html: &str) -> Self {
        use scraper::{Html, Selector};

        let document = Self::new();
        let parsed = Html::parse_document(html);
        if let Ok(selector) = Selector::parse("[id]") {
            for node in parsed.select(&selector) {
                let Some(id) = node.value().id() else {
                    continue;
                };
                let element = document.insert(id, &node.inner_html());
                if let Some(src) = node.value().attr("src") {
                    element.set_navigation_target(src);
                }
            }
        }
        document
    }

    pub fn insert(&self, id: &str, content: &str) -> Arc<MemoryElement> {
        let element = Arc::new(MemoryElement::new(content));
        self.elements
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), Arc::clone(&element));
        element
    }

    pub fn get(&self, id: &str) -> Option<Arc<MemoryElement>> {
        self.elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .elements
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        ids.sort();
        ids
    }
}

impl Document for MemoryDocument {
    fn element_by_id(&self, id: &str) -> Option<Arc<dyn Element>> {
        self.get(id).map(|e| e as Arc<dyn Element>)
    }
}
