//! CLI entry point for yamlblog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yamlblog::commands::list::Format;
use yamlblog::config::IndexMode;

#[derive(Parser)]
#[command(name = "yamlblog")]
#[command(version)]
#[command(about = "Serve a blog written as YAML post files", long_about = None)]
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
    /// Start the blog server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,

        /// Keep one index in memory and refresh it when posts change
        #[arg(long)]
        shared: bool,
    },

    /// List all posts
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Load every post once and report errors
    Check,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "yamlblog=debug,info"
    } else {
        "yamlblog=info"
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

    match cli.command {
        Commands::Serve { port, ip, shared } => {
            let blog = yamlblog::Blog::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| blog.config.server.ip.clone());
            let port = port.unwrap_or(blog.config.server.port);
            let mode = if shared {
                IndexMode::Shared
            } else {
                blog.config.server.index_mode
            };

            tracing::info!("Serving posts from {:?} ({:?} index)", blog.posts_dir, mode);
            yamlblog::server::start(blog, &ip, port, mode).await?;
        }

        Commands::List { format } => {
            let blog = yamlblog::Blog::new(&base_dir)?;
            yamlblog::commands::list::run(&blog, format)?;
        }

        Commands::Check => {
            let blog = yamlblog::Blog::new(&base_dir)?;
            let count = yamlblog::commands::check::run(&blog)?;
            println!("{} posts loaded successfully", count);
        }

        Commands::Version => {
            println!("yamlblog version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
