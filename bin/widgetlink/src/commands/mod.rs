pub mod completions_cmd;
pub mod config_cmd;
pub mod fetch;
pub mod refresh;
pub mod status;
pub mod uri;

use widgetlink_core::{Config, Paths};

/// Page settings given on the command line.
pub struct PageArgs {
    pub location: Option<String>,
    pub session: Option<String>,
}

/// Loads the config file and applies command-line overrides.
pub fn load_config(args: &PageArgs) -> anyhow::Result<Config> {
    let paths = Paths::new();
    let mut config = Config::load_or_default(&paths)?;
    apply_overrides(&mut config, args);
    Ok(config)
}

/// Checks a `/`-separated widget path given on the command line. Every
/// segment must be a non-empty id.
pub fn widget_path(widget: &str) -> anyhow::Result<&str> {
    if widget.split('/').any(str::is_empty) {
        anyhow::bail!("Invalid widget path '{}': empty segment", widget);
    }
    Ok(widget)
}

fn apply_overrides(config: &mut Config, args: &PageArgs) {
    if let Some(location) = &args.location {
        config.page.location = location.clone();
    }
    if let Some(session) = &args.session {
        config.page.session = session.clone();
    }
}
