use std::net::SocketAddr;

use anyhow::Context;
use merge_notifier::config::{Config, default_log_filter};
use merge_notifier::github::OctocrabClient;
use merge_notifier::notify::DiscordNotifier;
use merge_notifier::persistence::{SeenEventStore, SharedStore};
use merge_notifier::server::{AppState, build_router};
use merge_notifier::worker::{self, PollConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    let level = std::env::var("LOG_LEVEL").ok();
                    default_log_filter(level.as_deref()).into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Starting GitHub PR Monitor\n{}", config);

    let retention = chrono::Duration::days(i64::from(config.retention_days));
    let store = SharedStore::new(SeenEventStore::open_with_retention(
        &config.seen_prs_file,
        retention,
    ));

    let source = OctocrabClient::from_token(config.github_token.clone(), config.repo.clone())
        .context("failed to build GitHub client")?
        .with_per_page(config.max_prs_per_request);
    let notifier = DiscordNotifier::new(config.discord_webhook_url.clone())
        .context("failed to build Discord client")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);

    let app = build_router(AppState::new(store.clone()));
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!(error = %e, "HTTP server stopped");
        }
    });

    let poll_config = PollConfig::from_config(&config);
    worker::run(&source, &notifier, &store, &poll_config, shutdown_signal()).await;

    info!(seen = store.count(), "GitHub PR Monitor stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
