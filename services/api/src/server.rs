use crate::cli::ServeArgs;
use crate::infra::{AppState, AtlasSource};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use volcano_atlas::config::AppConfig;
use volcano_atlas::error::AppError;
use volcano_atlas::telemetry::{self, LogSink};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    args.dataset.apply(&mut config.dataset);

    telemetry::init(&config.telemetry, LogSink::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    // Load and validate before binding; a bad dataset is fatal.
    let source = AtlasSource::new(config.dataset.clone());
    let atlas = source.atlas()?;

    let app = with_service_routes(source)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        volcanoes = atlas.volcanoes().len(),
        loaded_at = %atlas.loaded_at(),
        "volcano atlas ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
