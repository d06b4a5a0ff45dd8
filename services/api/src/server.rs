use crate::cli::ServeArgs;
use crate::infra::{seed_demo_store, AppState};
use crate::routes::with_application_routes;
use applytrack::config::AppConfig;
use applytrack::error::AppError;
use applytrack::telemetry;
use applytrack::tracking::{ApplicationListingService, InMemoryApplicationStore};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = InMemoryApplicationStore::default();
    if config.store.seed_demo {
        seed_demo_store(&store);
        info!(applications = store.application_count(), "seeded demo applications");
    }
    let listing_service = Arc::new(ApplicationListingService::new(Arc::new(store)));

    let app = with_application_routes(listing_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "application tracker ready");

    axum::serve(listener, app).await?;
    Ok(())
}
