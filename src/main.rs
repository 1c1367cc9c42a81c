use quotes_api::{
    application::quotes::use_case::QuotesUseCase,
    config::Config,
    infrastructure::{
        database::pool::create_pool, ids::uuid_generator::UuidV4Generator,
        repositories::sqlx_quote_repository::SqlxQuoteRepository,
    },
    presentation::http::{routes::create_router, state::AppState},
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // RUST_LOG wins when set and valid
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| {
            tracing_subscriber::EnvFilter::try_new("info,quotes_api=debug,tower_http=debug")
        })
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = Config::from_env()?;
    let db = create_pool(
        &config.database_url,
        config.database_max_connections,
        config.statement_timeout_ms,
    )
    .await?;

    if config.run_migrations {
        let mut migrator = sqlx::migrate!("./migrations");
        migrator.set_ignore_missing(config.ignore_missing_migrations);
        migrator.run(&db).await?;
    }

    let quotes = QuotesUseCase::new(
        Box::new(SqlxQuoteRepository::new(db.clone())),
        Box::new(UuidV4Generator),
    );

    let state = AppState {
        config: Arc::new(config.clone()),
        quotes: Arc::new(quotes),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Quotes API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("SIGTERM received, initiating graceful shutdown");
        }
    }
}
