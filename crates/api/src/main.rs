use std::sync::Arc;

use anyhow::Context;
use mockable::DefaultClock;

use inkwell_api::app::{build_app, AppServices};
use inkwell_auth::Hs256Jwt;
use inkwell_infra::{db, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;
    inkwell_observability::init(config.log_format);

    if config.uses_dev_secret() {
        tracing::warn!("JWT_SECRET not set; using insecure dev default");
    }

    let jwt = Hs256Jwt::new(config.jwt_secret.as_bytes()).with_ttl(config.token_ttl);
    let clock = Arc::new(DefaultClock);

    let services = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::connect(url, config.database_max_connections)
                .await
                .context("failed to connect to postgres")?;
            db::migrate(&pool)
                .await
                .context("failed to apply database migrations")?;
            AppServices::postgres(pool, jwt, clock)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            AppServices::in_memory(jwt, clock)
        }
    };

    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
