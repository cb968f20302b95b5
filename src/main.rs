//! CLI entry point for flatpages

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flatpages::commands::list::ListOptions;

#[derive(Parser)]
#[command(name = "flatpages")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Query and serve flat-file pages with YAML metadata", long_about = None)]
struct Cli {
    /// Set the application root (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output and debug-mode reloading
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List pages
    #[command(alias = "ls")]
    List {
        /// Metadata field to order by, prefix with '-' for descending
        #[arg(short, long)]
        order_by: Option<String>,

        /// Keep pages matching KEY[__OPERATOR]=VALUE (repeatable, OR-combined)
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filter: Vec<String>,

        /// Drop pages matching KEY[__OPERATOR]=VALUE (repeatable)
        #[arg(short, long = "exclude", value_name = "KEY=VALUE")]
        exclude: Vec<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print one page rendered to HTML
    Show {
        /// Logical page path, e.g. blog/hello
        path: String,

        /// Only the part before the "more" marker
        #[arg(long)]
        intro: bool,

        /// Print the metadata first
        #[arg(long)]
        meta: bool,
    },

    /// Print CSS for highlighted code blocks
    StyleDefs {
        /// Highlight style (defaults to the configured one)
        #[arg(short, long)]
        style: Option<String>,
    },

    /// Serve rendered pages over HTTP
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "flatpages=debug,info"
    } else {
        "flatpages=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let site = flatpages::Site::new(&base_dir)?;

    match cli.command {
        Commands::List {
            order_by,
            filter,
            exclude,
            json,
        } => {
            let options = ListOptions {
                order_by,
                filters: filter,
                excludes: exclude,
                json,
            };
            flatpages::commands::list::run(&site, &options)?;
        }

        Commands::Show { path, intro, meta } => {
            flatpages::commands::show::run(&site, &path, intro, meta)?;
        }

        Commands::StyleDefs { style } => {
            flatpages::commands::style::run(&site, style.as_deref())?;
        }

        Commands::Serve { port, ip } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            flatpages::server::start(&site, &ip, port, cli.debug).await?;
        }
    }

    Ok(())
}
