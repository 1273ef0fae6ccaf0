// src/middleware/request_logger.rs

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

// Loga método, rota, status e latência de cada requisição atendida
pub async fn request_logger(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = Instant::now();
    let response = next.run(request).await;
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        latency_ms = format!("{:.2}", latency_ms),
        "requisição atendida"
    );

    response
}
