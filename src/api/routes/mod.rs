//! API routes module

pub mod events;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Calendar events for one month
        .nest("/events", events::router())
}
