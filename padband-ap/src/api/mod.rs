//! REST API implementation for the pad service
//!
//! Presentation glue: binds the engine to HTTP controls and streams live
//! events over SSE.

pub mod handlers;
pub mod sse;

use axum::{
    extract::State,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::engine::PadEngine;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Pad engine
    pub engine: Arc<PadEngine>,
    /// Server port
    pub port: u16,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check (no prefix for health endpoint)
        .route("/health", get(health_check))

        // API v1 routes
        .nest("/api/v1", Router::new()
            // Session status
            .route("/status", get(handlers::get_status))

            // Button-to-sound assignments
            .route("/assignments", get(handlers::get_assignments))
            .route("/assignments", post(handlers::set_assignments))
            .route("/assignments/:button", post(handlers::set_assignment))
            .route("/assignments/:button", delete(handlers::clear_assignment))

            // Remote sound browsing
            .route("/sounds", get(handlers::list_sound_folders))
            .route("/sounds/:folder", get(handlers::list_sound_files))

            // Synthetic button press (UI trigger path)
            .route("/buttons/:button/press", post(handlers::press_button))

            // Recording control
            .route("/record/start", post(handlers::start_recording))
            .route("/record/stop", post(handlers::stop_recording))

            // Recordings CRUD and replay
            .route("/recordings", get(handlers::list_recordings))
            .route("/recordings/:id/rename", post(handlers::rename_recording))
            .route("/recordings/:id", delete(handlers::delete_recording))
            .route("/recordings/:id/play", post(handlers::play_recording))
            .route("/replay/stop", post(handlers::stop_replay))

            // SSE events
            .route("/events", get(sse::event_stream))
        )

        // Enable CORS for local access
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "module": "padband-ap",
        "version": env!("CARGO_PKG_VERSION"),
        "port": state.port,
    }))
}
