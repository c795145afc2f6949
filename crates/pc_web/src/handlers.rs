use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use pc_core::logging::preview;
use pc_core::{iso_timestamp, ColumnRequest, ColumnResponse, Error, ErrorResponse};
use serde::Serialize;
use tracing::{error, info};

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(status: StatusCode, body: ErrorResponse) -> Response {
    (status, Json(body)).into_response()
}

fn invalid(reason: &str) -> Response {
    let error = Error::InvalidInput(reason.to_string());
    error_response(status_for(&error), ErrorResponse::from_error(&error))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: iso_timestamp(Utc::now()),
    })
}

pub async fn generate_column(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.trim_start().starts_with("application/json"));
    if !is_json {
        return invalid("Content-Type은 application/json이어야 합니다");
    }

    let body = match body {
        Ok(body) => body,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return error_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponse::new(format!(
                    "요청 크기가 너무 큽니다. 최대 {}KB까지 허용됩니다.",
                    state.max_request_size / 1024
                )),
            );
        }
        Err(_) => return invalid("요청 본문을 읽을 수 없습니다"),
    };

    let request: ColumnRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            info!("Rejected malformed column request: {}", e);
            return invalid("요청 본문이 올바른 JSON 형식이 아닙니다");
        }
    };

    info!("📨 Column request for '{}'", preview(request.topic.trim(), 50));
    match state.service.generate(&request).await {
        Ok(article) => Json(ColumnResponse {
            success: true,
            article,
            processed_date: iso_timestamp(Utc::now()),
        })
        .into_response(),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("❌ Column generation failed: {}", e);
            }
            error_response(status, ErrorResponse::from_error(&e))
        }
    }
}
