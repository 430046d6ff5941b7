use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryScopeRepository};
use crate::routes::with_scope_routes;
use axum::extract::DefaultBodyLimit;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use restore_scope::config::AppConfig;
use restore_scope::error::AppError;
use restore_scope::telemetry;
use restore_scope::workflows::scope_of_works::{ScopeOfWorksEngine, ScopeOfWorksService};
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

    let repository = Arc::new(InMemoryScopeRepository::default());
    let engine = ScopeOfWorksEngine::new(config.scope.clone());
    let scope_service = Arc::new(ScopeOfWorksService::new(repository, engine));

    let app = with_scope_routes(scope_service)
        .layer(DefaultBodyLimit::max(config.scope.max_body_bytes))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scope of works service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
