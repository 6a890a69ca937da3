use widgetlink_core::Paths;
use widgetlink_transport::{HttpAcquirer, TransportAcquirer};
use widgetlink_widget::uri::base_uri_of;

use super::{load_config, PageArgs};

pub async fn run(args: &PageArgs) -> anyhow::Result<()> {
    let paths = Paths::new();
    let config = load_config(args)?;

    println!("widgetlink status");
    println!("=================");
    println!();

    let config_path = paths.config_file();
    println!(
        "Config:    {} {}",
        config_path.display(),
        if config_path.exists() { "✓" } else { "✗ (not found, using defaults)" }
    );

    let Some(location) = config.page_location() else {
        println!("Page:      ✗ no location configured");
        println!();
        println!("Run `widgetlink config set page.location <url>` or pass --location.");
        return Ok(());
    };
    let base_uri = base_uri_of(location);
    println!("Page:      {}", location);
    println!("Base URI:  {}", base_uri);
    println!(
        "Session:   {}",
        if config.page.session.is_empty() { "✗ (empty)" } else { "✓ set" }
    );
    println!();

    println!("Transport:");
    println!("  timeout:    {}s", config.transport.timeout_secs);
    println!("  user agent: {}", config.transport.user_agent);
    println!("  redirects:  {}", if config.transport.follow_redirects { "follow" } else { "stop" });
    match config.transport.proxy.as_deref() {
        None => println!("  proxy:      (environment)"),
        Some("") => println!("  proxy:      direct"),
        Some(proxy) => println!("  proxy:      {}", proxy),
    }
    let acquirer = HttpAcquirer::new(&config.transport, base_uri);
    println!(
        "  available:  {}",
        if acquirer.acquire().is_some() { "✓" } else { "✗" }
    );
    println!();

    println!("Placeholders:");
    println!(
        "  content: {}<path>{}",
        config.placeholders.content_prefix, config.placeholders.suffix
    );
    println!(
        "  nested:  {}<path>{}  (mode: {})",
        config.placeholders.nested_prefix, config.placeholders.suffix, config.refresh.nested_context_mode
    );
    Ok(())
}
