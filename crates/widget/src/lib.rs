//! Widget tree addressing and request URI construction.

pub mod placeholder;
pub mod tree;
pub mod uri;

pub use placeholder::{element_id, PlaceholderKind};
pub use tree::{RootContext, WidgetNode};
pub use uri::{escape, widget_uri, UriRequest};
