mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::PageArgs;

#[derive(Parser)]
#[command(name = "widgetlink")]
#[command(about = "Address and refresh server-composed widgets", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Page location (overrides config page.location)
    #[arg(long, global = true)]
    location: Option<String>,

    /// Session token (overrides config page.session)
    #[arg(long, global = true)]
    session: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the request URI for a widget
    Uri {
        /// Widget path, e.g. "sidebar/news"
        widget: String,
        /// URI relative to the widget, may carry a query string
        relative: Option<String>,
        /// focus, frame, proxy or save
        #[arg(short, long, default_value = "focus")]
        mode: String,
        /// Explicit frame target (ignored by frame, proxy and save)
        #[arg(long)]
        frame: Option<String>,
    },

    /// GET a widget and print the response
    Get {
        widget: String,
        relative: Option<String>,
        #[arg(short, long, default_value = "proxy")]
        mode: String,
    },

    /// POST to a widget in proxy mode
    Post {
        widget: String,
        relative: Option<String>,
        #[arg(long)]
        content_type: Option<String>,
        /// Request body; "-" reads standard input
        #[arg(long)]
        body: Option<String>,
    },

    /// Refresh a widget inside a page document and print the result
    Refresh {
        widget: String,
        relative: Option<String>,
        /// Server-rendered page to load placeholders from
        #[arg(long)]
        html: Option<std::path::PathBuf>,
        /// Host the widget in a nested browsing context
        #[arg(long)]
        nested: bool,
    },

    /// Show configuration and transport status
    Status,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish)
        shell: String,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,
    /// Get a config value by dot-separated key (e.g. transport.timeout_secs)
    Get { key: String },
    /// Set a config value by dot-separated key
    Set {
        key: String,
        /// Value to set (auto-detects JSON types)
        value: String,
    },
    /// Reset config to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let page_args = PageArgs {
        location: cli.location,
        session: cli.session,
    };

    match cli.command {
        Commands::Uri {
            widget,
            relative,
            mode,
            frame,
        } => {
            commands::uri::run(&page_args, &widget, relative.as_deref(), &mode, frame.as_deref())?;
        }
        Commands::Get {
            widget,
            relative,
            mode,
        } => {
            commands::fetch::get(&page_args, &widget, relative.as_deref(), &mode).await?;
        }
        Commands::Post {
            widget,
            relative,
            content_type,
            body,
        } => {
            commands::fetch::post(
                &page_args,
                &widget,
                relative.as_deref(),
                content_type.as_deref(),
                body.as_deref(),
            )
            .await?;
        }
        Commands::Refresh {
            widget,
            relative,
            html,
            nested,
        } => {
            commands::refresh::run(&page_args, &widget, relative.as_deref(), html.as_deref(), nested)
                .await?;
        }
        Commands::Status => {
            commands::status::run(&page_args).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => commands::config_cmd::show().await?,
            ConfigCommands::Get { key } => commands::config_cmd::get(&key).await?,
            ConfigCommands::Set { key, value } => commands::config_cmd::set(&key, &value).await?,
            ConfigCommands::Reset { force } => commands::config_cmd::reset(force).await?,
        },
        Commands::Completions { shell } => {
            commands::completions_cmd::run(&shell)?;
        }
    }

    Ok(())
}
