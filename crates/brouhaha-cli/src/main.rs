use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "brouhaha")]
#[command(about = "Brouhaha CLI - archive and find AR sessions", long_about = None)]
struct Cli {
    /// Data directory holding blobs, records and the geo index
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Archive a world map and its preview at a coordinate
    Save {
        #[arg(long)]
        map: PathBuf,
        #[arg(long)]
        preview: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Fetch the world map of an archived session
    Load {
        id: String,
        #[arg(long)]
        out: PathBuf,
    },
    /// List archived sessions near a coordinate
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Search radius in miles (defaults to the configured radius)
        #[arg(long)]
        radius_miles: Option<f64>,
    },
    /// List all archived sessions, newest first
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let context = commands::context::AppContext::open(cli.data_dir, cli.config)?;

    match cli.command {
        Commands::Save {
            map,
            preview,
            lat,
            lon,
        } => commands::save::run(&context, &map, &preview, lat, lon).await?,
        Commands::Load { id, out } => commands::load::run(&context, &id, &out).await?,
        Commands::Nearby {
            lat,
            lon,
            radius_miles,
        } => commands::nearby::run(&context, lat, lon, radius_miles).await?,
        Commands::List => commands::list::run(&context).await?,
    }

    Ok(())
}
