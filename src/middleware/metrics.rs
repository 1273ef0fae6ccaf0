// src/middleware/metrics.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppState;

// Contadores locais ao processo, best-effort: não são consistentes entre
// instâncias e zeram num restart.
#[derive(Default)]
pub struct AppMetrics {
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_latency_micros: AtomicU64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub total_errors: u64,
    pub avg_latency_ms: f64,
}

impl AppMetrics {
    pub fn record(&self, status: StatusCode, latency: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_latency_micros
            .fetch_add(latency.as_micros() as u64, Ordering::Relaxed);
        if status.is_server_error() {
            self.total_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_errors = self.total_errors.load(Ordering::Relaxed);
        let total_latency_micros = self.total_latency_micros.load(Ordering::Relaxed);

        let avg_latency_ms = if total_requests > 0 {
            let avg = total_latency_micros as f64 / total_requests as f64 / 1000.0;
            (avg * 100.0).round() / 100.0
        } else {
            0.0
        };

        MetricsSnapshot {
            total_requests,
            total_errors,
            avg_latency_ms,
        }
    }
}

// Middleware de agregação: conta requisições, erros 5xx e latência total
pub async fn track_metrics(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let response = next.run(request).await;
    app_state.metrics.record(response.status(), start.elapsed());
    response
}

// GET /api/metrics
#[utoipa::path(
    get,
    path = "/api/metrics",
    tag = "Sistema",
    responses(
        (status = 200, description = "Snapshot dos contadores do processo", body = MetricsSnapshot)
    )
)]
pub async fn metrics_snapshot(State(app_state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(app_state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::AppMetrics;
    use axum::http::StatusCode;
    use std::time::Duration;

    #[test]
    fn snapshot_averages_latency_and_counts_server_errors() {
        let metrics = AppMetrics::default();
        metrics.record(StatusCode::OK, Duration::from_millis(10));
        metrics.record(StatusCode::INTERNAL_SERVER_ERROR, Duration::from_millis(30));
        metrics.record(StatusCode::NOT_FOUND, Duration::from_millis(20));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 3);
        assert_eq!(snapshot.total_errors, 1);
        assert!((snapshot.avg_latency_ms - 20.0).abs() < 0.01);
    }

    #[test]
    fn empty_snapshot_has_zero_average() {
        let snapshot = AppMetrics::default().snapshot();
        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.avg_latency_ms, 0.0);
    }
}
