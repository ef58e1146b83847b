//! HTTP request handlers
//!
//! Implements REST endpoints for session status, assignments, sound
//! browsing, recording control and replay.

use crate::api::AppState;
use crate::recorder::RecorderState;
use crate::replay::ReplayStatus;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use padband_common::model::{Recording, SoundAssignments, SoundRef};
use padband_common::Error;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    connected: bool,
    recorder: String,
    pending_actions: usize,
    replay: ReplayStatusInfo,
}

#[derive(Debug, Serialize)]
pub struct ReplayStatusInfo {
    state: String,
    recording_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    folder: String,
    file: String,
}

#[derive(Debug, Serialize)]
pub struct PressResponse {
    status: String,
    button: u8,
}

#[derive(Debug, Deserialize, Default)]
pub struct StopRecordingRequest {
    name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordingSavedResponse {
    status: String,
    recording_id: Uuid,
    name: String,
    action_count: usize,
}

#[derive(Debug, Serialize)]
pub struct RecordingInfo {
    id: Uuid,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    action_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    name: String,
}

#[derive(Debug, Serialize)]
pub struct FolderListResponse {
    folders: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    folder: String,
    files: Vec<String>,
}

type HandlerError = (StatusCode, Json<StatusResponse>);

/// Map a core error to an HTTP response
fn error_response(err: Error) -> HandlerError {
    let status = match &err {
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Fetch(_) => StatusCode::BAD_GATEWAY,
        _ => {
            error!("Internal error: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(StatusResponse {
            status: format!("error: {}", err),
        }),
    )
}

fn ok() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /status - connectivity, recorder state and replay state
pub async fn get_status(State(state): State<AppState>) -> Json<SessionStatusResponse> {
    let status = state.engine.status();
    let (replay_state, recording_id) = match status.replay {
        ReplayStatus::Idle => ("idle", None),
        ReplayStatus::Playing { recording_id } => ("playing", Some(recording_id)),
        ReplayStatus::Finished { recording_id } => ("finished", Some(recording_id)),
    };
    Json(SessionStatusResponse {
        connected: status.connected,
        recorder: match status.recorder {
            RecorderState::Idle => "idle".to_string(),
            RecorderState::Recording => "recording".to_string(),
        },
        pending_actions: status.pending_actions,
        replay: ReplayStatusInfo {
            state: replay_state.to_string(),
            recording_id,
        },
    })
}

// ============================================================================
// Assignments
// ============================================================================

/// GET /assignments - current button-to-sound table
pub async fn get_assignments(State(state): State<AppState>) -> Json<SoundAssignments> {
    Json(state.engine.resolver().snapshot())
}

/// POST /assignments - replace the whole table
pub async fn set_assignments(
    State(state): State<AppState>,
    Json(table): Json<SoundAssignments>,
) -> Result<Json<StatusResponse>, HandlerError> {
    state
        .engine
        .resolver()
        .set_assignments(table)
        .map_err(error_response)?;
    Ok(ok())
}

/// POST /assignments/{button} - assign one button
pub async fn set_assignment(
    State(state): State<AppState>,
    Path(button): Path<u8>,
    Json(req): Json<AssignmentRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    state
        .engine
        .resolver()
        .assign(button, SoundRef::new(req.folder, req.file))
        .map_err(error_response)?;
    Ok(ok())
}

/// DELETE /assignments/{button} - clear one button
pub async fn clear_assignment(
    State(state): State<AppState>,
    Path(button): Path<u8>,
) -> Json<StatusResponse> {
    state.engine.resolver().unassign(button);
    ok()
}

// ============================================================================
// Sound Browsing
// ============================================================================

/// GET /sounds - list remote sound folders
pub async fn list_sound_folders(
    State(state): State<AppState>,
) -> Result<Json<FolderListResponse>, HandlerError> {
    let folders = state
        .engine
        .sounds()
        .list_folders()
        .await
        .map_err(error_response)?;
    Ok(Json(FolderListResponse { folders }))
}

/// GET /sounds/{folder} - list files in a remote folder
pub async fn list_sound_files(
    State(state): State<AppState>,
    Path(folder): Path<String>,
) -> Result<Json<FileListResponse>, HandlerError> {
    let files = state
        .engine
        .sounds()
        .list_files(&folder)
        .await
        .map_err(error_response)?;
    Ok(Json(FileListResponse { folder, files }))
}

// ============================================================================
// Button Press (synthetic)
// ============================================================================

/// POST /buttons/{button}/press - synthetic press through the command channel
pub async fn press_button(
    State(state): State<AppState>,
    Path(button): Path<u8>,
) -> Result<Json<PressResponse>, HandlerError> {
    match state.engine.channel().press(button) {
        Some(button) => Ok(Json(PressResponse {
            status: "ok".to_string(),
            button,
        })),
        None => Err(error_response(Error::InvalidInput(format!(
            "Button {} out of range",
            button
        )))),
    }
}

// ============================================================================
// Recording Control
// ============================================================================

/// POST /record/start - enter recording mode
pub async fn start_recording(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, HandlerError> {
    state.engine.start_recording().map_err(error_response)?;
    Ok(ok())
}

/// POST /record/stop - finalize and persist the take
pub async fn stop_recording(
    State(state): State<AppState>,
    body: Option<Json<StopRecordingRequest>>,
) -> Result<Json<RecordingSavedResponse>, HandlerError> {
    let name = body.and_then(|Json(req)| req.name);
    let recording = state
        .engine
        .stop_recording(name)
        .await
        .map_err(error_response)?;
    Ok(Json(RecordingSavedResponse {
        status: "ok".to_string(),
        recording_id: recording.id,
        name: recording.name,
        action_count: recording.actions.len(),
    }))
}

// ============================================================================
// Recordings CRUD and Replay
// ============================================================================

/// GET /recordings - list saved recordings
pub async fn list_recordings(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecordingInfo>>, HandlerError> {
    let recordings = state
        .engine
        .list_recordings()
        .await
        .map_err(error_response)?;
    Ok(Json(recordings.iter().map(recording_info).collect()))
}

/// POST /recordings/{id}/rename
pub async fn rename_recording(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<RenameRequest>,
) -> Result<Json<StatusResponse>, HandlerError> {
    state
        .engine
        .rename_recording(id, &req.name)
        .await
        .map_err(error_response)?;
    Ok(ok())
}

/// DELETE /recordings/{id}
pub async fn delete_recording(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, HandlerError> {
    state
        .engine
        .delete_recording(id)
        .await
        .map_err(error_response)?;
    Ok(ok())
}

/// POST /recordings/{id}/play - start replay
pub async fn play_recording(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusResponse>, HandlerError> {
    state
        .engine
        .play_recording(id)
        .await
        .map_err(error_response)?;
    Ok(ok())
}

/// POST /replay/stop - stop the active replay (idempotent)
pub async fn stop_replay(State(state): State<AppState>) -> Json<StatusResponse> {
    state.engine.stop_replay();
    ok()
}

fn recording_info(recording: &Recording) -> RecordingInfo {
    RecordingInfo {
        id: recording.id,
        name: recording.name.clone(),
        created_at: recording.created_at,
        action_count: recording.actions.len(),
    }
}
