use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use ecowitt_config::{ConfigError, SettingsFile};
use ecowitt_core::{AssignmentModel, CycleReport, ReportSink};
use opentelemetry::metrics::{Counter, MeterProvider};
use opentelemetry_prometheus::exporter;
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::sync::{watch, Mutex};

pub struct AppState {
    ready: AtomicBool,
    registry: Registry,
    #[allow(dead_code)]
    provider: SdkMeterProvider,
    requests_total: Counter<u64>,
    cycles_total: Counter<u64>,
    fetch_failures_total: Counter<u64>,
    latest: Mutex<Option<CycleReport>>,
    assignment: watch::Sender<Arc<AssignmentModel>>,
    settings_file: Mutex<Option<SettingsFile>>,
}

/// Build the router. Assignment edits go out through `assignment`; when a
/// settings file is given they are persisted to it first.
pub fn build_app(
    assignment: watch::Sender<Arc<AssignmentModel>>,
    settings_file: Option<SettingsFile>,
) -> (Router, Arc<AppState>) {
    // Prometheus exporter via OpenTelemetry
    let registry = Registry::new();
    let reader = exporter()
        .with_registry(registry.clone())
        .build()
        .expect("prom exporter");
    let provider = SdkMeterProvider::builder().with_reader(reader).build();
    let meter = provider.meter("ecowitt-api");

    let requests_total = meter
        .u64_counter("ecowitt_requests_total")
        .with_description("Total HTTP requests served")
        .init();
    let cycles_total = meter
        .u64_counter("ecowitt_cycles_total")
        .with_description("Refresh cycles published")
        .init();
    let fetch_failures_total = meter
        .u64_counter("ecowitt_fetch_failures_total")
        .with_description("Refresh cycles that failed to fetch from the gateway")
        .init();

    let state = Arc::new(AppState {
        ready: AtomicBool::new(false),
        registry,
        provider,
        requests_total,
        cycles_total,
        fetch_failures_total,
        latest: Mutex::new(None),
        assignment,
        settings_file: Mutex::new(settings_file),
    });

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics))
        .route("/api/v1/snapshot", get(snapshot))
        .route(
            "/api/v1/assignment",
            get(current_assignment).put(replace_assignment),
        )
        .with_state(Arc::clone(&state));

    (router, state)
}

pub fn set_ready(state: &Arc<AppState>, is_ready: bool) {
    state.ready.store(is_ready, Ordering::Relaxed);
}

/// Record a cycle outcome as the latest report. The first report marks the
/// service ready.
pub async fn publish_report(state: &Arc<AppState>, report: CycleReport) {
    state.cycles_total.add(1, &[]);
    if report.is_failure() {
        state.fetch_failures_total.add(1, &[]);
    }
    {
        let mut latest = state.latest.lock().await;
        *latest = Some(report);
    }
    set_ready(state, true);
}

/// Feeds cycle reports into the HTTP state
pub struct ApiSink {
    state: Arc<AppState>,
}

impl ApiSink {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }
}

#[async_trait::async_trait]
impl ReportSink for ApiSink {
    async fn publish(&mut self, report: &CycleReport) -> Result<()> {
        publish_report(&self.state, report.clone()).await;
        Ok(())
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> StatusCode {
    state.requests_total.add(1, &[]);
    StatusCode::OK
}

async fn readyz(State(state): State<Arc<AppState>>) -> StatusCode {
    if state.ready.load(Ordering::Relaxed) {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn metrics(
    State(state): State<Arc<AppState>>,
) -> (
    [(axum::http::header::HeaderName, axum::http::HeaderValue); 1],
    String,
) {
    let encoder = TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buf = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buf) {
        tracing::warn!(error=?e, "failed to encode metrics");
    }
    let body = String::from_utf8(buf).unwrap_or_default();
    let header = (
        header::CONTENT_TYPE,
        axum::http::HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    ([header], body)
}

async fn snapshot(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let latest = state.latest.lock().await;
    if let Some(report) = latest.as_ref() {
        return (StatusCode::OK, Json(report)).into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn current_assignment(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let model = state.assignment.borrow().clone();
    (StatusCode::OK, Json(model.as_ref().clone())).into_response()
}

async fn replace_assignment(
    State(state): State<Arc<AppState>>,
    Json(model): Json<AssignmentModel>,
) -> impl IntoResponse {
    state.requests_total.add(1, &[]);
    let model = model.canonicalized();
    if let Err(e) = model.validate() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"status":"error","error": e.to_string()})),
        )
            .into_response();
    }

    // Held until the model is published so edits reach disk and the
    // scheduler in the same order.
    let mut settings_file = state.settings_file.lock().await;
    if let Some(file) = settings_file.as_mut() {
        let mut next = file.clone();
        let to_persist = model.clone();
        let persisted = tokio::task::spawn_blocking(move || {
            next.replace_assignment(to_persist)?;
            Ok::<_, ConfigError>(next)
        })
        .await;
        let error = match persisted {
            Ok(Ok(next)) => {
                *file = next;
                None
            }
            Ok(Err(e)) => Some(e.to_string()),
            Err(e) => Some(format!("persist task failed: {e}")),
        };
        if let Some(error) = error {
            tracing::error!(error = %error, path = %file.path().display(), "failed to persist assignment");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"status":"error","error": error})),
            )
                .into_response();
        }
    }

    tracing::info!(
        sensors = model.sensors.len(),
        soil = model.soil.len(),
        "Assignment replaced"
    );
    state.assignment.send_replace(Arc::new(model));
    drop(settings_file);

    (StatusCode::OK, Json(serde_json::json!({"status":"ok"}))).into_response()
}
