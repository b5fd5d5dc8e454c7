use clap::{Parser, Subcommand};

use receiver_core::config::{load_dotenv, Config};
use receiver_server::startup;

/// Image intake service: records submitted paths and queues them for processing.
#[derive(Parser, Debug)]
#[command(name = "receiver", version, about)]
struct Cli {
    /// Config profile; keys resolve as {PROFILE}_{KEY} before {KEY}.
    #[arg(long, env = "RECEIVER_PROFILE", default_value = "")]
    profile: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve {
        /// Do not apply migrations on startup.
        #[arg(long)]
        skip_migrations: bool,
    },
    /// Apply database migrations and exit.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::for_profile(&cli.profile);
    config.log_summary();

    match cli.command.unwrap_or(Command::Serve { skip_migrations: false }) {
        Command::Serve { skip_migrations } => startup::serve(&config, !skip_migrations).await,
        Command::Migrate => startup::migrate(&config).await,
    }
}
