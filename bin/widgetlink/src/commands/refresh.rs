use std::path::Path;
use std::sync::Arc;
use widgetlink_page::{MemoryDocument, Page, RefreshOutcome};

use super::{load_config, widget_path, PageArgs};

/// Refresh one widget inside an in-memory copy of the page.
///
/// Placeholders come from `html` when given; missing ones are created so the
/// refresh has somewhere to land.
pub async fn run(
    args: &PageArgs,
    widget: &str,
    relative: Option<&str>,
    html: Option<&Path>,
    nested: bool,
) -> anyhow::Result<()> {
    let widget = widget_path(widget)?;
    let config = load_config(args)?;
    let document = Arc::new(match html {
        Some(path) => MemoryDocument::from_html(&std::fs::read_to_string(path)?),
        None => MemoryDocument::new(),
    });
    let page = Page::from_config(&config, document.clone())?;
    let node = page.ensure_widget(widget);

    let content_id = node
        .content_element_id(&config.placeholders)
        .ok_or_else(|| anyhow::anyhow!("Widget '{}' is not addressable", widget))?;
    if document.get(&content_id).is_none() {
        document.insert(&content_id, "");
    }
    if nested {
        if let Some(nested_id) = node.nested_context_element_id(&config.placeholders) {
            if document.get(&nested_id).is_none() {
                document.insert(&nested_id, "");
            }
        }
    }

    match page.refresh().reload(&node, relative).await? {
        RefreshOutcome::Navigated { element_id, uri } => {
            println!("✓ {} → {}", element_id, uri);
        }
        RefreshOutcome::Inline(handle) => {
            handle.wait().await;
            if handle.is_success() {
                eprintln!("✓ {} replaced ({})", content_id, handle.status());
                if let Some(element) = document.get(&content_id) {
                    println!("{}", element.content());
                }
            } else {
                match handle.error() {
                    Some(error) => eprintln!("✗ Widget did not refresh: {}", error),
                    None => eprintln!("✗ Widget did not refresh: status {}", handle.status()),
                }
            }
        }
    }
    Ok(())
}
