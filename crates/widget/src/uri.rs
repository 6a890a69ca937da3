//! Request URI construction.
//!
//! Parameters are appended to the base URI in a fixed order the server
//! relies on: `session`, `focus`, `frame`, `raw`, `save`, `path`, followed by
//! the untouched query string of the relative URI.

use std::borrow::Cow;

use widgetlink_core::Mode;

/// Inputs for one request URI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UriRequest<'a> {
    /// Path of the focused widget; `None` means the widget is unaddressable.
    pub focus: Option<&'a str>,
    /// Explicit frame target. Overridden by the focus for modes that frame it.
    pub frame: Option<&'a str>,
    pub mode: Mode,
    /// Relative URI inside the widget, optionally with a query string.
    pub path: Option<&'a str>,
}

impl<'a> UriRequest<'a> {
    pub fn new(focus: Option<&'a str>, path: Option<&'a str>, mode: Mode) -> Self {
        Self {
            focus,
            frame: None,
            mode,
            path,
        }
    }

    pub fn with_frame(mut self, frame: Option<&'a str>) -> Self {
        self.frame = frame;
        self
    }
}

/// Escapes a parameter value; everything outside `A-Za-z0-9-._~` is
/// percent-encoded, including `/`.
pub fn escape(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Splits a relative URI at the first `?`. The query part keeps its `?`.
pub fn split_query(uri: &str) -> (&str, Option<&str>) {
    match uri.find('?') {
        Some(qmark) => (&uri[..qmark], Some(&uri[qmark..])),
        None => (uri, None),
    }
}

/// Builds the request URI for a widget, or `None` when there is no focus.
pub fn widget_uri(base_uri: &str, session: &str, request: &UriRequest<'_>) -> Option<String> {
    let focus = request.focus?;

    let mut uri = String::with_capacity(base_uri.len() + 64);
    uri.push_str(base_uri);
    uri.push_str(";session=");
    uri.push_str(&escape(session));
    uri.push_str("&focus=");
    uri.push_str(&escape(focus));

    let frame = if request.mode.frames_focus() {
        Some(focus)
    } else {
        request.frame
    };
    if let Some(frame) = frame {
        uri.push_str("&frame=");
        uri.push_str(&escape(frame));
    }

    match request.mode {
        Mode::Proxy => uri.push_str("&raw=1"),
        Mode::Save => uri.push_str("&save=1"),
        Mode::Focus | Mode::Frame => {}
    }

    if let Some(path) = request.path {
        let (path, query_string) = split_query(path);
        uri.push_str("&path=");
        uri.push_str(&escape(path));
        if let Some(query_string) = query_string {
            uri.push_str(query_string);
        }
    }

    Some(uri)
}

/// Strips path parameters, query and fragment from a document location.
pub fn base_uri_of(location: &str) -> &str {
    match location.find([';', '?', '#']) {
        Some(pos) => &location[..pos],
        None => location,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://h/p";

    fn uri(focus: &str, path: Option<&str>, mode: Mode) -> String {
        widget_uri(BASE, "S1", &UriRequest::new(Some(focus), path, mode)).unwrap()
    }

    #[test]
    fn test_frame_scenario() {
        assert_eq!(
            uri("a/b", Some("x"), Mode::Frame),
            "http://h/p;session=S1&focus=a%2Fb&frame=a%2Fb&path=x"
        );
    }

    #[test]
    fn test_no_focus_is_none() {
        let req = UriRequest::new(None, Some("x"), Mode::Proxy);
        assert!(widget_uri(BASE, "S1", &req).is_none());
    }

    #[test]
    fn test_proxy_mode() {
        let u = uri("w", None, Mode::Proxy);
        assert_eq!(u, "http://h/p;session=S1&focus=w&frame=w&raw=1");
        assert!(!u.contains("save=1"));
    }

    #[test]
    fn test_save_mode() {
        let u = uri("w", None, Mode::Save);
        assert_eq!(u, "http://h/p;session=S1&focus=w&frame=w&save=1");
        assert!(!u.contains("raw=1"));
    }

    #[test]
    fn test_focus_mode_has_no_frame() {
        let u = uri("w", Some("index.html"), Mode::Focus);
        assert_eq!(u, "http://h/p;session=S1&focus=w&path=index.html");
        assert!(!u.contains("frame="));
        assert!(!u.contains("raw=1"));
        assert!(!u.contains("save=1"));
    }

    #[test]
    fn test_explicit_frame_without_mode() {
        let req = UriRequest::new(Some("a/b"), None, Mode::Focus).with_frame(Some("a"));
        assert_eq!(
            widget_uri(BASE, "S1", &req).unwrap(),
            "http://h/p;session=S1&focus=a%2Fb&frame=a"
        );
    }

    #[test]
    fn test_mode_overrides_explicit_frame() {
        let req = UriRequest::new(Some("a/b"), None, Mode::Proxy).with_frame(Some("a"));
        let u = widget_uri(BASE, "S1", &req).unwrap();
        assert!(u.contains("&frame=a%2Fb&"));
    }

    #[test]
    fn test_query_string_passes_through() {
        let u = uri("w", Some("a/b?x=1&y=2"), Mode::Proxy);
        assert!(u.ends_with("&raw=1&path=a%2Fb?x=1&y=2"), "{}", u);
    }

    #[test]
    fn test_session_is_escaped() {
        let u = widget_uri(BASE, "a b&c", &UriRequest::new(Some("w"), None, Mode::Focus)).unwrap();
        assert_eq!(u, "http://h/p;session=a%20b%26c&focus=w");
    }

    #[test]
    fn test_deterministic() {
        let req = UriRequest::new(Some("a/b"), Some("q?z=1"), Mode::Save);
        assert_eq!(widget_uri(BASE, "S1", &req), widget_uri(BASE, "S1", &req));
    }

    #[test]
    fn test_split_query() {
        assert_eq!(split_query("a/b?x=1?y"), ("a/b", Some("?x=1?y")));
        assert_eq!(split_query("a/b"), ("a/b", None));
        assert_eq!(split_query("?x"), ("", Some("?x")));
    }

    #[test]
    fn test_base_uri_of() {
        assert_eq!(base_uri_of("http://h/p;session=1?x#y"), "http://h/p");
        assert_eq!(base_uri_of("http://h/p#frag"), "http://h/p");
        assert_eq!(base_uri_of("http://h/p?a;b"), "http://h/p");
        assert_eq!(base_uri_of("http://h/p"), "http://h/p");
    }
}
