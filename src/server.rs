//! HTTP API: каждый запрос - одно взаимодействие пользователя

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::apps::DemandApps;
use crate::pipeline::{run_guarded, Outcome};
use crate::presentation::render_chart_svg;
use crate::types::{ControlsOutput, ForecastQuery, RegionalQuery, ScenarioInput};

#[derive(Clone)]
pub struct AppState {
    apps: Arc<DemandApps>,
}

impl AppState {
    pub fn new(apps: DemandApps) -> Self {
        Self {
            apps: Arc::new(apps),
        }
    }
}

impl<T: Serialize> IntoResponse for Outcome<T> {
    fn into_response(self) -> Response {
        let status = match self.failure_kind() {
            None => StatusCode::OK,
            Some("artifact_load") | Some("data_load") => StatusCode::SERVICE_UNAVAILABLE,
            Some("forecast") | Some("internal") => StatusCode::INTERNAL_SERVER_ERROR,
            Some(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };
        (status, Json(self)).into_response()
    }
}

/// Пайплайн читает файлы, поэтому выполняется вне асинхронного рантайма
async fn run_blocking<T, F>(app: &'static str, state: AppState, pipeline: F) -> Outcome<T>
where
    T: Send + 'static,
    F: FnOnce(&DemandApps) -> crate::error::Result<T> + Send + 'static,
{
    let apps = Arc::clone(&state.apps);
    match tokio::task::spawn_blocking(move || run_guarded(app, || pipeline(apps.as_ref()))).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(app, error = %e, "Pipeline task failed");
            Outcome::Failure {
                kind: "internal".to_string(),
                message: e.to_string(),
                recoverable: false,
            }
        }
    }
}

/// Некорректные параметры запроса возвращаются тем же `Outcome`, что и ошибки пайплайна
fn rejected(app: &str, rejection: impl std::fmt::Display) -> Response {
    tracing::warn!(app, error = %rejection, "Request input rejected");
    Outcome::<()>::Failure {
        kind: "invalid_input".to_string(),
        message: rejection.to_string(),
        recoverable: true,
    }
    .into_response()
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/controls", get(controls))
        .route("/api/regions", get(list_regions))
        .route("/api/forecast", get(forecast))
        .route("/api/forecast/chart.svg", get(forecast_chart))
        .route("/api/forecast/regional", get(regional_forecast))
        .route("/api/predict/linear", post(predict_linear))
        .route("/api/predict/xgboost", post(predict_xgboost))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Retail Demand Forecasting API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn controls(State(state): State<AppState>) -> Json<ControlsOutput> {
    Json(state.apps.controls())
}

async fn list_regions(State(state): State<AppState>) -> Response {
    run_blocking("regions", state, |apps| apps.regions())
        .await
        .into_response()
}

async fn forecast(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected("forecast", rejection),
    };
    run_blocking("forecast", state, move |apps| apps.forecast(query.n_days))
        .await
        .into_response()
}

async fn forecast_chart(
    State(state): State<AppState>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected("forecast", rejection),
    };
    let outcome = run_blocking("forecast", state, move |apps| apps.forecast(query.n_days)).await;
    match outcome {
        Outcome::Success { value } => (
            [(header::CONTENT_TYPE, "image/svg+xml")],
            render_chart_svg(&value),
        )
            .into_response(),
        failure => failure.into_response(),
    }
}

async fn regional_forecast(
    State(state): State<AppState>,
    query: Result<Query<RegionalQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected("regional", rejection),
    };
    run_blocking("regional", state, move |apps| {
        apps.regional_forecast(&query.region, query.n_days, query.discount)
    })
    .await
    .into_response()
}

async fn predict_linear(
    State(state): State<AppState>,
    input: Result<Json<ScenarioInput>, JsonRejection>,
) -> Response {
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return rejected("linear", rejection),
    };
    run_blocking("linear", state, move |apps| apps.predict_linear(&input))
        .await
        .into_response()
}

async fn predict_xgboost(
    State(state): State<AppState>,
    input: Result<Json<ScenarioInput>, JsonRejection>,
) -> Response {
    let Json(input) = match input {
        Ok(input) => input,
        Err(rejection) => return rejected("xgboost", rejection),
    };
    run_blocking("xgboost", state, move |apps| apps.predict_xgboost(&input))
        .await
        .into_response()
}
