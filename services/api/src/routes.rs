use crate::infra::{parse_metric, AppState, AtlasSource, FilterParams};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use volcano_atlas::atlas::filter::ViewRow;
use volcano_atlas::atlas::views::{self, MapPoint};
use volcano_atlas::atlas::{DatasetSummary, MapMetric};
use volcano_atlas::error::AppError;

const DEFAULT_TOP_COUNTRIES: usize = 10;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MapQuery {
    #[serde(default)]
    pub(crate) metric: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TopQuery {
    #[serde(default)]
    pub(crate) top: Option<usize>,
}

#[derive(Debug, Serialize)]
pub(crate) struct VolcanoesResponse<'a> {
    pub(crate) summary: DatasetSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(crate) warnings: Vec<String>,
    pub(crate) volcanoes: &'a [ViewRow<'a>],
}

#[derive(Debug, Serialize)]
pub(crate) struct MapResponse {
    pub(crate) metric: MapMetric,
    pub(crate) metric_label: &'static str,
    pub(crate) points: Vec<MapPoint>,
}

pub(crate) fn atlas_router(source: AtlasSource) -> Router {
    Router::new()
        .route("/api/v1/volcanoes", get(volcanoes_endpoint))
        .route("/api/v1/summary", get(summary_endpoint))
        .route("/api/v1/map", get(map_endpoint))
        .route("/api/v1/countries", get(countries_endpoint))
        .route("/api/v1/treemap", get(treemap_endpoint))
        .route("/api/v1/options", get(options_endpoint))
        .route("/api/v1/boundaries", get(boundaries_endpoint))
        .with_state(source)
}

pub(crate) fn with_service_routes(source: AtlasSource) -> Router {
    atlas_router(source)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "loading" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn volcanoes_endpoint(
    State(source): State<AtlasSource>,
    Query(params): Query<FilterParams>,
) -> Result<Response, AppError> {
    let atlas = source.atlas()?;
    let view = atlas.filter(&params.to_spec(atlas.bounds()));
    let summary = atlas.summary(&view);

    let payload = VolcanoesResponse {
        summary,
        warnings: view.range_errors.iter().map(ToString::to_string).collect(),
        volcanoes: &view.rows,
    };
    Ok(Json(payload).into_response())
}

pub(crate) async fn summary_endpoint(
    State(source): State<AtlasSource>,
    Query(params): Query<FilterParams>,
) -> Result<Json<DatasetSummary>, AppError> {
    let atlas = source.atlas()?;
    let view = atlas.filter(&params.to_spec(atlas.bounds()));
    Ok(Json(atlas.summary(&view)))
}

pub(crate) async fn map_endpoint(
    State(source): State<AtlasSource>,
    Query(params): Query<FilterParams>,
    Query(map): Query<MapQuery>,
) -> Result<Json<MapResponse>, AppError> {
    let metric = match map.metric.as_deref() {
        Some(raw) => parse_metric(raw).map_err(AppError::BadRequest)?,
        None => MapMetric::default(),
    };

    let atlas = source.atlas()?;
    let view = atlas.filter(&params.to_spec(atlas.bounds()));
    Ok(Json(MapResponse {
        metric,
        metric_label: metric.label(),
        points: views::map_points(&view, metric),
    }))
}

pub(crate) async fn countries_endpoint(
    State(source): State<AtlasSource>,
    Query(params): Query<FilterParams>,
    Query(top): Query<TopQuery>,
) -> Result<Json<Vec<views::CountryBreakdown>>, AppError> {
    let atlas = source.atlas()?;
    let view = atlas.filter(&params.to_spec(atlas.bounds()));
    let top = top.top.unwrap_or(DEFAULT_TOP_COUNTRIES);
    Ok(Json(views::country_breakdown(&view, Some(top))))
}

pub(crate) async fn treemap_endpoint(
    State(source): State<AtlasSource>,
    Query(params): Query<FilterParams>,
) -> Result<Json<Vec<views::TreemapNode>>, AppError> {
    let atlas = source.atlas()?;
    let view = atlas.filter(&params.to_spec(atlas.bounds()));
    Ok(Json(views::treemap(&view)))
}

pub(crate) async fn options_endpoint(
    State(source): State<AtlasSource>,
) -> Result<Json<views::FilterOptions>, AppError> {
    let atlas = source.atlas()?;
    Ok(Json(atlas.options()))
}

pub(crate) async fn boundaries_endpoint(
    State(source): State<AtlasSource>,
) -> Result<Response, AppError> {
    let atlas = source.atlas()?;
    Ok(Json(atlas.boundaries()).into_response())
}
