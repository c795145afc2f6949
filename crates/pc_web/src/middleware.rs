use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use pc_core::{Error, ErrorResponse};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::{debug, warn};

use crate::handlers::error_response;
use crate::AppState;

/// Best-effort client identity: first proxy hop, then the socket peer.
pub fn client_key(req: &Request) -> String {
    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = forwarded {
        return ip.to_string();
    }
    let real_ip = req
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(ip) = real_ip {
        return ip.to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let client = client_key(&req);
    if !state.limiter.check(&client) {
        warn!("Rate limit exceeded for {}", client);
        return error_response(
            StatusCode::TOO_MANY_REQUESTS,
            ErrorResponse::from_error(&Error::RateLimited),
        );
    }
    next.run(req).await
}

/// Adds security headers and the processing time to every response.
pub async fn security_headers(req: Request, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let mut response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    let headers = response.headers_mut();
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    if let Ok(value) = HeaderValue::from_str(&format!("{:.4}", elapsed)) {
        headers.insert("x-process-time", value);
    }

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        warn!("{} {} - {} in {:.3}s", method, path, status, elapsed);
    } else {
        debug!("{} {} - {} in {:.3}s", method, path, status, elapsed);
    }
    response
}
