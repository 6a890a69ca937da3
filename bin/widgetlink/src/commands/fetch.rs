use std::io::Read;
use std::sync::Arc;
use widgetlink_core::Mode;
use widgetlink_page::{MemoryDocument, Page};
use widgetlink_transport::RequestHandle;

use super::{load_config, widget_path, PageArgs};

fn open_page(args: &PageArgs) -> anyhow::Result<Page> {
    let config = load_config(args)?;
    Ok(Page::from_config(&config, Arc::new(MemoryDocument::new()))?)
}

fn print_response(handle: &RequestHandle) {
    if let Some(error) = handle.error() {
        eprintln!("✗ {} failed: {}", handle.url(), error);
        return;
    }
    eprintln!("{} {}", if handle.is_success() { "✓" } else { "✗" }, handle.status());
    if let Some(content_type) = handle.header("content-type") {
        eprintln!("  Content-Type: {}", content_type);
    }
    println!("{}", handle.response_text());
}

/// GET a widget and print the response body.
pub async fn get(args: &PageArgs, widget: &str, relative: Option<&str>, mode: &str) -> anyhow::Result<()> {
    let widget = widget_path(widget)?;
    let mode: Mode = mode.parse()?;
    let page = open_page(args)?;
    let node = page.ensure_widget(widget);

    let handle = page.fetcher().get(&node, relative, None, Some(mode)).await?;
    print_response(&handle);
    Ok(())
}

/// POST to a widget. A body of "-" is read from standard input.
pub async fn post(
    args: &PageArgs,
    widget: &str,
    relative: Option<&str>,
    content_type: Option<&str>,
    body: Option<&str>,
) -> anyhow::Result<()> {
    let widget = widget_path(widget)?;
    let body = match body {
        Some("-") => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            Some(input)
        }
        other => other.map(str::to_string),
    };

    let page = open_page(args)?;
    let node = page.ensure_widget(widget);
    let handle = page
        .fetcher()
        .post(&node, relative, content_type, body.as_deref(), None)
        .await?;
    print_response(&handle);
    Ok(())
}
