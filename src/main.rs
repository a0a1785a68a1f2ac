/// Vaccination centre availability service
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use vitemadose::clients::ViteMaDoseClient;
use vitemadose::config::AppConfig;
use vitemadose::handlers::AppState;
use vitemadose::repo::{CountyRepo, SnapshotRepo};
use vitemadose::routes::build_router;
use vitemadose::services::CentreService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    // Load configuration
    let config = AppConfig::from_env()?;
    info!(
        api_url = %config.api_url,
        chronodose_min = config.chronodose_min,
        "Configuration loaded successfully"
    );

    let client = ViteMaDoseClient::new(
        config.api_url.clone(),
        Duration::from_secs(config.http_timeout_seconds),
    )?;

    let centre_service = Arc::new(CentreService::new(
        SnapshotRepo::new(),
        CountyRepo::new(),
        client,
        config.chronodose_min,
        Duration::from_secs(config.refresh_seconds),
    ));

    start_refresh_task(&config, centre_service.clone());

    let state = AppState { centre_service };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.listen_addr.as_str()).await?;
    info!("vitemadose service listening on {}", config.listen_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Keep the configured departments warm
fn start_refresh_task(config: &AppConfig, service: Arc<CentreService>) {
    if config.departments.is_empty() {
        info!("No departments configured for background refresh");
        return;
    }

    let departments = config.departments.clone();
    let interval = config.refresh_seconds;
    tokio::spawn(async move {
        info!(
            "Starting centre refresh task for {:?} (interval: {}s)",
            departments, interval
        );
        loop {
            let refreshed = service.refresh_all(&departments).await;
            if refreshed.len() < departments.len() {
                warn!(
                    "Refreshed {}/{} departments",
                    refreshed.len(),
                    departments.len()
                );
            }
            tokio::time::sleep(Duration::from_secs(interval)).await;
        }
    });
}
