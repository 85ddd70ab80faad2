use anyhow::Result;
use clap::{Parser, Subcommand};
use job_tracker::core::ConfigManager;
use job_tracker::start_web_server;
use job_tracker::user_cli::{handle_user_command, UserCli};
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Parser)]
#[command(name = "jobtrack")]
#[command(about = "Personal job application tracker API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the API server (the default when no command is given)
    Serve,
    /// Administer the user store
    User(UserCli),
}

#[tokio::main]
async fn main() -> Result<()> {
    Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or(EnvFilter::new("job_tracker=INFO,jobtrack=INFO,rocket::server=OFF")),
        )
        .init();

    let cli = Cli::parse();

    let config = ConfigManager::load()?;
    config.ensure_directories().await?;

    match cli.command {
        Some(Command::User(user_cli)) => {
            handle_user_command(user_cli, config.environment.database_path.clone()).await
        }
        Some(Command::Serve) | None => {
            info!("Starting job application tracker");
            info!(
                "Environment: {}",
                std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string())
            );
            info!("Data: {}", config.environment.data_path.display());
            info!("Database: {}", config.environment.database_path.display());

            start_web_server(
                config.environment.database_path.clone(),
                config.environment.port,
            )
            .await
        }
    }
}
