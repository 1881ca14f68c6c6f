use std::sync::Arc;

use crate::core::AppConfig;
use crate::google::{self, CalendarClient};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    // Built once at startup. On failure holds the reason so each request
    // can answer with a configuration error.
    pub calendar: Result<CalendarClient, String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let calendar = google::connect(&config).map_err(|e| {
            tracing::warn!("Calendar client unavailable: {}", e);
            e.to_string()
        });
        if let Ok(client) = &calendar {
            tracing::info!(
                client_email = client.client_email(),
                "Loaded service account credentials"
            );
        }
        Self { config, calendar }
    }
}
