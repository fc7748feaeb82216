use axum::{
    Router,
    http::{HeaderValue, Method, header},
};
use deployment::Deployment;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utils::config::AppConfig;

use crate::DeploymentImpl;

pub mod docs;
pub mod fields;
pub mod fills;
pub mod health;

pub fn router(deployment: DeploymentImpl) -> Router {
    Router::new()
        .merge(fields::router(&deployment))
        .merge(fills::router(&deployment))
        .merge(health::router(&deployment))
        .merge(docs::router(&deployment))
        .layer(cors_layer(deployment.config()))
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_origins.is_empty() || config.cors_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}
