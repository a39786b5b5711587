mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vibe_core::config::{AnalyticsConfig, DATA_DIR_ENV};
use vibe_core::store::AnalyticsStore;

#[derive(Parser)]
#[command(
    name = "vibe",
    about = "Analytics dashboard and progress tracking for scaffolded vibecoding projects",
    version,
    propagate_version = true
)]
struct Cli {
    /// Analytics data directory (default: ~/.vibecoding)
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the analytics dashboard (default)
    Dashboard,

    /// Show status counts and tech-stack / project-type popularity
    Stats,

    /// Show progress for every tracked project
    Progress,

    /// Parse a single CONTEXT.md (or a project directory containing .agent/CONTEXT.md)
    Check { path: PathBuf },

    /// Record a project-creation event
    Track {
        /// Project display name
        #[arg(long)]
        name: String,

        /// Absolute path of the project directory
        #[arg(long)]
        path: String,

        /// Project type tag (repeat up to three times)
        #[arg(long = "type", value_name = "TYPE")]
        types: Vec<String>,

        /// Tech-stack component, e.g. --stack backend="Node.js + Express"
        #[arg(long = "stack", value_name = "KEY=VALUE", value_parser = cmd::track::parse_key_val)]
        stack: Vec<(String, String)>,

        /// Discovered tool version, e.g. --env node=v20.11.0
        #[arg(long = "env", value_name = "KEY=VALUE", value_parser = cmd::track::parse_key_val)]
        env: Vec<(String, String)>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = run(cli);

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AnalyticsConfig::resolve(cli.data_dir.as_deref())
        .context("failed to resolve analytics data directory")?;
    let store = AnalyticsStore::new(config);

    match cli.command.unwrap_or(Commands::Dashboard) {
        Commands::Dashboard => cmd::dashboard::run(&store, cli.json),
        Commands::Stats => cmd::stats::run(&store, cli.json),
        Commands::Progress => cmd::progress::run(&store, cli.json),
        Commands::Check { path } => cmd::check::run(&store, &path, cli.json),
        Commands::Track {
            name,
            path,
            types,
            stack,
            env,
        } => cmd::track::run(&store, name, path, types, stack, env, cli.json),
    }
}
