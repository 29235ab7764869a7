use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pizza_restaurant_service::{app, config::Config, db, establish_connection, seed};

#[derive(Parser)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API, upgrading the schema first
    Serve,
    /// Manage schema migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Replace the catalog with sample data
    Seed,
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply every pending migration
    Run,
    /// Revert the most recent migration
    Revert,
    /// List migrations and whether they are applied
    Status,
}

fn migrate(
    config: &Config,
    action: &MigrateAction,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let conn = &mut establish_connection(&config.database_url)?;

    match action {
        MigrateAction::Run => {
            let applied = db::run_migrations(conn)?;
            if applied.is_empty() {
                info!("schema is up to date");
            }
            for version in applied {
                info!(%version, "applied migration");
            }
        }
        MigrateAction::Revert => {
            let version = db::revert_last_migration(conn)?;
            info!(%version, "reverted migration");
        }
        MigrateAction::Status => {
            for migration in db::migration_status(conn)? {
                let mark = if migration.applied { "applied" } else { "pending" };
                println!("{mark:<8} {}", migration.name);
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match &cli.command {
        Commands::Serve => app::serve(config).await,
        Commands::Migrate { action } => migrate(&config, action),
        Commands::Seed => {
            let db = db::Database::open(&config.database_url)?;
            seed::seed(&mut db.connection())?;
            Ok(())
        }
    }
}
