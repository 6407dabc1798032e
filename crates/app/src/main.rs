use std::sync::Arc;

use clap::Parser;
use engine::{Engine, SharedIdentity};
use gastos_sync::Session;
use migration::{Migrator, MigratorTrait};

use crate::{
    cli::{Cli, Command, UserCommand},
    error::{AppError, Result},
    settings::Database,
};

mod cli;
mod commands;
mod error;
mod settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load(&cli)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "gastos={level},gastos_sync={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let database = parse_database(&settings.database).await?;
    let identity = SharedIdentity::new();
    let engine = Engine::builder()
        .database(database)
        .identity(identity.clone())
        .build()
        .await?;

    match cli.command {
        Command::User(user) => match user.command {
            UserCommand::Create(args) => {
                if settings.password.is_empty() {
                    return Err(AppError::Usage(
                        "set the password in the config file or GASTOS__PASSWORD".to_string(),
                    ));
                }
                let created = engine.register_user(&args.username, &settings.password).await?;
                tracing::info!(user = %created.username, "user created");
                println!("{}", serde_json::to_string_pretty(&created)?);
                Ok(())
            }
        },
        command => {
            let session = Session::sign_in(
                Arc::new(engine),
                identity,
                &settings.username,
                &settings.password,
            )
            .await?;
            let result = commands::run(&session, command).await;
            session.sign_out();
            result
        }
    }
}

async fn parse_database(config: &Database) -> Result<sea_orm::DatabaseConnection> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
