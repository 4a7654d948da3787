// src/bin/manage.rs
// DOCUMENTATION: Operational commands for deployments and CI
// PURPOSE: wait-for-db, migrate and create-superuser, run before or beside the server

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_api::config::{self, Config};
use recipe_api::services::{self, PasswordHasher, UserService};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "manage", about = "Recipe API management commands")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Block until the database accepts connections
    WaitForDb {
        /// Seconds to sleep between attempts
        #[arg(long, default_value_t = 1)]
        interval: u64,
    },
    /// Apply pending schema migrations
    Migrate,
    /// Create a staff account with every permission
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SUPERUSER_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env();

    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    env_logger::init();

    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;

    match cli.command {
        Command::WaitForDb { interval } => {
            let url = config.database_url.clone();
            services::wait_for_db(
                |_database| services::check_database(&url),
                Duration::from_secs(interval),
            )
            .await;
        }
        Command::Migrate => {
            let pool = config::init_db_pool(&config)
                .await
                .context("failed to connect to database")?;
            config::run_migrations(&pool)
                .await
                .context("failed to apply migrations")?;
        }
        Command::CreateSuperuser { email, password } => {
            let pool = config::init_db_pool(&config)
                .await
                .context("failed to connect to database")?;
            let hasher = PasswordHasher::new(config.password_hash_iterations);
            let user = UserService::create_superuser(&pool, hasher, &email, &password)
                .await
                .context("failed to create superuser")?;
            log::info!("Superuser {} created", user.email);
        }
    }

    Ok(())
}
