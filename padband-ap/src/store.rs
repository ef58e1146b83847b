//! Recording store
//!
//! CRUD over persisted recordings. Each recording is one row; the actions
//! and instrument snapshot travel as JSON text, so a row insert is the whole
//! write and a recording is either fully present or fully absent.

use padband_common::model::{ButtonAction, Recording, SoundAssignments};
use padband_common::{Error, Result};
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct RecordingStore {
    pool: SqlitePool,
}

impl RecordingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new recording
    pub async fn create(&self, recording: &Recording) -> Result<Uuid> {
        let actions = serde_json::to_string(&recording.actions)
            .map_err(|e| Error::Internal(format!("Serialize actions: {}", e)))?;
        let instruments = serde_json::to_string(&recording.instruments)
            .map_err(|e| Error::Internal(format!("Serialize instruments: {}", e)))?;

        sqlx::query(
            "INSERT INTO recordings (guid, name, created_at, actions, instruments)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(recording.id.to_string())
        .bind(&recording.name)
        .bind(recording.created_at.to_rfc3339())
        .bind(actions)
        .bind(instruments)
        .execute(&self.pool)
        .await?;

        Ok(recording.id)
    }

    /// All recordings, newest first
    pub async fn list(&self) -> Result<Vec<Recording>> {
        let rows = sqlx::query_as::<_, (String, String, String, String, String)>(
            "SELECT guid, name, created_at, actions, instruments
             FROM recordings ORDER BY created_at DESC, guid",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_recording).collect()
    }

    /// Fetch one recording by id
    pub async fn get(&self, id: Uuid) -> Result<Recording> {
        let row = sqlx::query_as::<_, (String, String, String, String, String)>(
            "SELECT guid, name, created_at, actions, instruments
             FROM recordings WHERE guid = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Recording {}", id)))?;

        row_to_recording(row)
    }

    /// Rename a recording; actions and instruments are untouched
    pub async fn rename(&self, id: Uuid, new_name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE recordings SET name = ? WHERE guid = ?")
            .bind(new_name)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Recording {}", id)));
        }
        Ok(())
    }

    /// Delete a recording
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM recordings WHERE guid = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Recording {}", id)));
        }
        Ok(())
    }
}

fn row_to_recording(
    (guid, name, created_at, actions, instruments): (String, String, String, String, String),
) -> Result<Recording> {
    let id = Uuid::parse_str(&guid)
        .map_err(|e| Error::Internal(format!("Corrupt recording guid {}: {}", guid, e)))?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| Error::Internal(format!("Corrupt created_at for {}: {}", guid, e)))?
        .with_timezone(&chrono::Utc);
    let actions: Vec<ButtonAction> = serde_json::from_str(&actions)
        .map_err(|e| Error::Internal(format!("Corrupt actions for {}: {}", guid, e)))?;
    let instruments: SoundAssignments = serde_json::from_str(&instruments)
        .map_err(|e| Error::Internal(format!("Corrupt instruments for {}: {}", guid, e)))?;

    Ok(Recording {
        id,
        name,
        created_at,
        actions,
        instruments,
    })
}
