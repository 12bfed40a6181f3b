use clap::Parser;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockroom::cli::{self, Cli, Commands, DbCommands, OrderCommands};
use stockroom::config::{Config, LogFormat, StorageBackend};
use stockroom::{cors_layer, create_app, db, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await,
        Commands::Db(DbCommands::Migrate) => cli::handle_db_migrate(&config).await,
        Commands::Orders(OrderCommands::MarkPaid { order_id }) => {
            let state = build_state(&config).await?;
            cli::handle_order_mark_paid(&state.ledger, order_id).await
        }
        Commands::Config => cli::handle_config_validate(&config),
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(config).await?;
            db::run_migrations(&pool, Path::new(db::POSTGRES_MIGRATIONS_DIR)).await?;
            Ok(AppState::postgres(pool))
        }
        StorageBackend::Sqlite => {
            let pool = db::create_sqlite_pool(config).await?;
            db::run_sqlite_migrations(&pool, Path::new(db::SQLITE_MIGRATIONS_DIR)).await?;
            Ok(AppState::sqlite(pool))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(AppState::in_memory())
        }
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = build_state(config).await?;
    let app = create_app(state).layer(cors_layer(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!("listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
