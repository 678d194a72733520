// =============================================================================
// REST API Endpoints: Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. The dashboard is read-only apart from
// the configuration endpoints, which reload the file or change the default
// indicator toggles.
//
// CORS is configured permissively for the browser front end.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::app_state::AppState;
use crate::dashboard::{resolve, DashboardQuery, DashboardView};
use crate::error::DashboardError;
use crate::runtime_config::{DashboardConfig, SymbolConfig};

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/symbols", get(symbols))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/headlines", get(headlines))
        .route("/api/v1/config", get(get_config))
        .route("/api/v1/config/reload", post(reload_config))
        .route("/api/v1/config/indicators", post(set_default_indicators))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Error mapping
// =============================================================================

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl DashboardError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnsupportedSymbol(_) | Self::InvalidDateRange { .. } => StatusCode::BAD_REQUEST,
            Self::EmptyResult { .. } => StatusCode::NOT_FOUND,
            Self::InsufficientData { .. } | Self::IndicatorComputation(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::ProviderShape(_) | Self::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Dashboard
// =============================================================================

async fn symbols(State(state): State<Arc<AppState>>) -> Json<Vec<SymbolConfig>> {
    Json(state.config.read().symbols.clone())
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardView>, DashboardError> {
    let config = state.config_snapshot();
    let today = chrono::Utc::now().date_naive();
    let request = resolve(&config, &query, today)?;
    let view = state.pipeline.render(&config, &request).await?;
    Ok(Json(view))
}

async fn headlines(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config_snapshot();
    Json(state.pipeline.headlines(&config).await)
}

// =============================================================================
// Configuration
// =============================================================================

async fn get_config(State(state): State<Arc<AppState>>) -> Json<DashboardConfig> {
    Json(state.config_snapshot())
}

async fn reload_config(State(state): State<Arc<AppState>>) -> Response {
    match state.reload_config() {
        Ok(config) => Json(config).into_response(),
        Err(e) => {
            warn!(error = %e, "configuration reload failed, keeping current config");
            let body = ErrorBody {
                error: "ConfigReloadError",
                message: format!("{e:#}"),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndicatorDefaultsUpdate {
    #[serde(default)]
    rsi: Option<bool>,
    #[serde(default)]
    macd: Option<bool>,
    #[serde(default)]
    bollinger: Option<bool>,
}

#[derive(Serialize)]
struct IndicatorDefaultsResponse {
    rsi: bool,
    macd: bool,
    bollinger: bool,
    changes: Vec<String>,
}

async fn set_default_indicators(
    State(state): State<Arc<AppState>>,
    Json(update): Json<IndicatorDefaultsUpdate>,
) -> impl IntoResponse {
    let mut changes = Vec::new();

    let updated = state.update_config(|config| {
        let toggles = &mut config.default_indicators;

        macro_rules! apply_toggle {
            ($field:ident) => {
                if let Some(val) = update.$field {
                    if toggles.$field != val {
                        changes.push(format!("{}: {} -> {}", stringify!($field), toggles.$field, val));
                        toggles.$field = val;
                    }
                }
            };
        }

        apply_toggle!(rsi);
        apply_toggle!(macd);
        apply_toggle!(bollinger);
        !changes.is_empty()
    });

    let config = match updated {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "failed to save default indicators to disk");
            state.config_snapshot()
        }
    };
    if !changes.is_empty() {
        info!(changes = ?changes, "default indicators updated");
    }

    let toggles = &config.default_indicators;
    Json(IndicatorDefaultsResponse {
        rsi: toggles.rsi,
        macd: toggles.macd,
        bollinger: toggles.bollinger,
        changes,
    })
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::market_data::provider::testing::{daily_bars, InMemoryProvider};
    use crate::market_data::provider::ProviderResponse;
    use crate::news::testing::{rss, StaticFeeds};

    const FEED: &str = "https://feed.example.com/rss";
    const RANGE: &str = "start=2024-01-01&end=2024-03-31";

    fn temp_config_path() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("dash-api-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("dashboard_config.json")
    }

    fn app_with(provider: InMemoryProvider) -> (Router, Arc<AppState>) {
        let mut config = DashboardConfig::default();
        config.news.feeds = vec![FEED.to_string()];
        let feeds = StaticFeeds::default().with(FEED, &rss(&["Ledger news", "Hashgraph news"]));
        let state = Arc::new(AppState::new(
            config,
            temp_config_path(),
            Arc::new(provider),
            Arc::new(feeds),
        ));
        (router(state.clone()), state)
    }

    fn closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 0.07 + (i as f64 * 0.2).cos() * 0.01).collect()
    }

    async fn send(app: Router, method: &str, uri: &str, body: Body) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body)
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, "GET", uri, Body::empty()).await
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (status, body) = get(app, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn symbols_lists_configured_set() {
        let (app, _) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (_, body) = get(app, "/api/v1/symbols").await;
        assert_eq!(body[0]["symbol"], "XRP-USD");
        assert_eq!(body[1]["display_name"], "Hedera (HBAR)");
    }

    #[tokio::test]
    async fn dashboard_renders_with_null_warmup() {
        let (app, _) = app_with(InMemoryProvider::with_bars("HBAR-USD", daily_bars(&closes(40))));
        let uri = format!("/api/v1/dashboard?symbol=HBAR-USD&{RANGE}&rsi=true&macd=false");
        let (status, body) = get(app, &uri).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display_name"], "Hedera (HBAR)");
        assert_eq!(body["enabled"], serde_json::json!(["RSI"]));
        let rsi = &body["charts"]["line_charts"][0];
        assert_eq!(rsi["series"], "RSI");
        assert!(rsi["values"][0].is_null());
        assert!(rsi["values"][13].is_number());
        assert_eq!(body["headlines"][0]["title"], "Ledger news");
    }

    #[tokio::test]
    async fn unsupported_symbol_is_bad_request() {
        let (app, _) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (status, body) = get(app, "/api/v1/dashboard?symbol=BTC-USD").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "UnsupportedSymbol");
    }

    #[tokio::test]
    async fn reversed_range_is_bad_request() {
        let (app, _) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (status, body) = get(app, "/api/v1/dashboard?start=2024-05-01&end=2024-04-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "InvalidDateRange");
    }

    #[tokio::test]
    async fn empty_result_is_not_found() {
        let (app, _) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (status, body) = get(app, &format!("/api/v1/dashboard?symbol=XRP-USD&{RANGE}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "EmptyResultError");
    }

    #[tokio::test]
    async fn insufficient_history_is_unprocessable() {
        let (app, _) = app_with(InMemoryProvider::with_bars("XRP-USD", daily_bars(&closes(5))));
        let (status, body) = get(app, &format!("/api/v1/dashboard?{RANGE}&macd=true")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "InsufficientDataError");
    }

    #[tokio::test]
    async fn provider_failure_is_bad_gateway() {
        let (app, _) = app_with(InMemoryProvider::failing("timed out"));
        let (status, body) = get(app, &format!("/api/v1/dashboard?{RANGE}")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "ProviderError");
    }

    #[tokio::test]
    async fn headlines_endpoint_reads_configured_feeds() {
        let (app, _) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (status, body) = get(app, "/api/v1/headlines").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn default_indicator_update_is_applied_and_saved() {
        let (app, state) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (status, body) = send(
            app.clone(),
            "POST",
            "/api/v1/config/indicators",
            Body::from(r#"{"bollinger": true, "rsi": true}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["bollinger"], true);
        assert_eq!(body["changes"], serde_json::json!(["bollinger: false -> true"]));
        assert!(state.config_snapshot().default_indicators.bollinger);

        let saved = DashboardConfig::load(&state.config_path).unwrap();
        assert!(saved.default_indicators.bollinger);

        let (_, config) = get(app, "/api/v1/config").await;
        assert_eq!(config["default_indicators"]["bollinger"], true);
    }

    #[tokio::test]
    async fn reload_of_missing_file_keeps_config() {
        let (app, state) = app_with(InMemoryProvider::with_response(ProviderResponse::default()));
        let (status, body) = send(app, "POST", "/api/v1/config/reload", Body::empty()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "ConfigReloadError");
        assert_eq!(state.config_snapshot().news.feeds, vec![FEED.to_string()]);
    }
}
