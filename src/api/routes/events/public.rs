//! Public types for the events API
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All three parameters are required
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    pub calendar_id: String,
    pub year: i32,
    pub month: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EventsResponse {
    // Event resources exactly as the provider returned them
    pub items: Vec<Value>,
}
