use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gridwatch")]
#[command(about = "Outage snapshot collector and derivation pipeline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the current outage feed and store a snapshot
    Fetch {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Derive outage events and parcel summaries from stored snapshots
    Derive {
        /// Config file path
        #[arg(short, long, default_value = "config/Config.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Fetch { config } => commands::fetch(&config).await,
        Commands::Derive { config } => commands::derive(&config).await,
    }
}
