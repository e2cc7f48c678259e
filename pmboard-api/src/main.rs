//! # pmboard API Server
//!
//! REST API for the project management dashboard: projects, tasks, time
//! logs, comments, and dashboard metrics, with email notifications on task
//! lifecycle events.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/pmboard JWT_SECRET=... cargo run -p pmboard-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use pmboard_api::{
    app::{build_router, AppState},
    config::{Config, LogFormat},
};
use pmboard_shared::{
    db::{migrations, pool, seed},
    notify::{LogMailer, Mailer, Notifier, SmtpMailer},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(LogFormat::from_env());

    let config = Config::from_env().context("Failed to load configuration")?;

    tracing::info!(
        "pmboard API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    migrations::run_migrations(&db)
        .await
        .context("Failed to run migrations")?;

    if config.seed_on_startup {
        let report = seed::seed(&db, Utc::now())
            .await
            .context("Failed to load seed data")?;
        tracing::info!(?report, "Seed data loaded");
    }

    let mailer: Arc<dyn Mailer> = match &config.mail.smtp {
        Some(smtp) => Arc::new(SmtpMailer::new(smtp).context("Invalid SMTP configuration")?),
        None => {
            tracing::warn!("SMTP_HOST not set, notification emails will only be logged");
            Arc::new(LogMailer)
        }
    };
    let notifier = Notifier::new(mailer, config.mail.frontend_url.clone());
    tracing::info!(mailer = notifier.mailer_name(), "Notifier ready");

    let address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config, notifier));

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, closing database pool...");
    pool::close_pool(db).await;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "pmboard_api=debug,pmboard_shared=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
