use widgetlink_core::Mode;
use widgetlink_widget::{RootContext, WidgetNode};

use super::{load_config, widget_path, PageArgs};

/// Print the request URI for a widget without contacting the server.
pub fn run(
    args: &PageArgs,
    widget: &str,
    relative: Option<&str>,
    mode: &str,
    frame: Option<&str>,
) -> anyhow::Result<()> {
    let widget = widget_path(widget)?;
    let config = load_config(args)?;
    let location = config
        .page_location()
        .ok_or_else(|| anyhow::anyhow!("No page location. Pass --location or set page.location."))?;
    let mode: Mode = mode.parse()?;

    let root = WidgetNode::root(RootContext::from_location(location, config.page.session.clone()));
    let node = root.ensure_descendant(widget);
    println!("{}", node.translate_uri_framed(relative, mode, frame)?);
    Ok(())
}
