mod api;
mod middleware;
mod search;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use pricecmp_db::PgCatalog;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = pricecmp_core::load_app_config()?;
    if config.log_enabled {
        let env_filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let pool_config = pricecmp_db::PoolConfig::from_app_config(&config);
    let pool = pricecmp_db::connect_pool(&config.database_url, pool_config).await?;

    let app = build_app(AppState {
        catalog: Arc::new(PgCatalog::new(pool)),
        nearby_search: config.nearby_search,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
