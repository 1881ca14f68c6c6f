use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{BoxError, Router, error_handling::HandleErrorLayer};
use http::HeaderValue;
use tower::ServiceBuilder;
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::public::ApiError;
use crate::api::state::{AppState, SharedState};
use crate::calendar::CalendarError;
use crate::core::{AppConfig, CorsOrigins};

/// CORS policy for the configured origins. With nothing configured the
/// policy is fully permissive, which production startup refuses.
pub fn cors_layer(origins: Option<&CorsOrigins>) -> CorsLayer {
    match origins {
        Some(CorsOrigins::List(origins)) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        }
        Some(CorsOrigins::Any) => CorsLayer::very_permissive(),
        None => {
            tracing::warn!("CALPROXY_CORS_ORIGINS is not set, allowing all origins");
            CorsLayer::very_permissive()
        }
    }
}

async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::from(CalendarError::Internal(anyhow::anyhow!("{}", err)))
    }
}

/// Abort requests that run longer than `timeout` with a 408 error body
pub fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .layer(TimeoutLayer::new(timeout)),
    )
}

pub fn app(shared_state: SharedState) -> Router {
    let cors = cors_layer(shared_state.config.cors_origins.as_ref());

    // API routes
    let router = Router::new().nest("/api", routes::router());

    with_request_timeout(router, shared_state.config.request_timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    let app_state = AppState::new(config);
    let app = app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
