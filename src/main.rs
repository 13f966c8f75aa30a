//! CLI entry point for noticeboard

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use noticeboard::content::{Priority, Status};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "noticeboard")]
#[command(version)]
#[command(about = "Publish markdown notices as a page and JSON feed", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static page and feed into the dist folder
    #[command(alias = "b")]
    Build {
        /// Rebuild whenever notices, template or config change
        #[arg(short, long)]
        watch: bool,
    },

    /// Serve the page and JSON API
    #[command(alias = "s")]
    Server {
        /// Port to listen on [default: server.port from config]
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// IP address to bind to [default: server.ip from config]
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Create a new notice
    New {
        /// Title of the new notice
        title: String,

        /// Priority: high, normal or low
        #[arg(short, long, default_value = "normal", value_parser = parse_priority)]
        priority: Priority,

        /// Status: scheduled, ongoing or completed
        #[arg(short, long, default_value = "completed", value_parser = parse_status)]
        status: Status,

        /// Author shown on the notice
        #[arg(short, long)]
        author: Option<String>,
    },

    /// List notices newest first
    List,

    /// Remove the dist folder
    Clean,

    /// Display version information
    Version,
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    s.parse()
        .map_err(|_| format!("unknown priority {:?} (expected high, normal or low)", s))
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.parse().map_err(|_| {
        format!(
            "unknown status {:?} (expected scheduled, ongoing or completed)",
            s
        )
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "noticeboard=debug,info"
    } else {
        "noticeboard=info"
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
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    match cli.command {
        Commands::Build { watch } => {
            let board = noticeboard::Noticeboard::new(&base_dir)?;
            tracing::info!("Building notices from {:?}", board.notices_dir);

            let report = board.build().await?;
            println!(
                "Built {} notices into {}",
                report.notices,
                report.dist_dir.display()
            );

            if watch {
                noticeboard::commands::build::watch(&board).await?;
            }
        }

        Commands::Server { port, ip, open } => {
            let board = noticeboard::Noticeboard::new(&base_dir)?;
            let port = port.unwrap_or(board.config.server.port);
            let ip = ip.unwrap_or_else(|| board.config.server.ip.clone());

            tracing::info!("Starting server at http://{}:{}", ip, port);
            noticeboard::server::start(&board, &ip, port, open).await?;
        }

        Commands::New {
            title,
            priority,
            status,
            author,
        } => {
            let board = noticeboard::Noticeboard::new(&base_dir)?;
            let path = noticeboard::commands::new::create_notice(
                &board,
                &title,
                priority,
                status,
                author.as_deref(),
            )?;
            println!("Created {}", path.display());
        }

        Commands::List => {
            let board = noticeboard::Noticeboard::new(&base_dir)?;
            noticeboard::commands::list::run(&board).await?;
        }

        Commands::Clean => {
            let board = noticeboard::Noticeboard::new(&base_dir)?;
            tracing::info!("Cleaning dist folder...");
            board.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("noticeboard version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
