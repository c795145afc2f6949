use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use pc_core::Result;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod rate_limit;
pub mod state;

pub use config::WebConfig;
pub use rate_limit::RateLimiter;
pub use state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}

pub fn create_app(state: AppState, config: &WebConfig) -> Router {
    let api = Router::new()
        .route("/api/generate-column", post(handlers::generate_column))
        .route_layer(from_fn_with_state(state.clone(), middleware::rate_limit));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .layer(DefaultBodyLimit::max(config.max_request_size))
        .layer(cors_layer(&config.allowed_origins))
        .layer(from_fn(middleware::security_headers))
        .with_state(state)
}

pub async fn serve(app: Router, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Server running on http://{}", addr);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState, WebConfig};
    pub use pc_core::{Error, Result};
}
