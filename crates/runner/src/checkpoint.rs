use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use diceforge_models::error::EngineError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::plan::SessionOutcome;

/// Durable snapshot of a plan's progress: which sessions finished and what
/// they reported. Written atomically (temp file + rename) so a crash mid-save
/// never leaves a half-written checkpoint for the next run to load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub plan_name: String,
    pub completed_session_ids: Vec<Uuid>,
    pub partial_summaries: Vec<SessionOutcome>,
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(plan_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            plan_name: plan_name.into(),
            completed_session_ids: Vec::new(),
            partial_summaries: Vec::new(),
            created_at,
        }
    }

    pub fn record(&mut self, outcome: SessionOutcome) {
        self.completed_session_ids.push(outcome.session_id);
        self.partial_summaries.push(outcome);
    }

    pub fn is_complete(&self, session_id: Uuid) -> bool {
        self.completed_session_ids.contains(&session_id)
    }

    /// Whether this checkpoint predates `now - max_age` and should be
    /// discarded rather than resumed from.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        now - self.created_at > max_age
    }

    /// Write to `path` via a sibling temp file, then rename over the target.
    /// `fs::rename` is atomic on the same filesystem, so readers never
    /// observe a partially-written file.
    pub fn save(&self, path: &Path) -> Result<(), EngineError> {
        let tmp_path = tmp_path_for(path);
        let json = serde_json::to_vec_pretty(self).map_err(|e| EngineError::SinkIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::write(&tmp_path, json).map_err(|e| EngineError::SinkIo {
            path: tmp_path.display().to_string(),
            reason: e.to_string(),
        })?;
        fs::rename(&tmp_path, path).map_err(|e| EngineError::SinkIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let bytes = fs::read(path).map_err(|e| EngineError::SinkIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| EngineError::SinkIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load `path` if present and not stale; otherwise a fresh checkpoint.
    pub fn load_or_new(
        path: &Path,
        plan_name: impl Into<String>,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> Result<Self, EngineError> {
        if !path.exists() {
            return Ok(Self::new(plan_name, now));
        }
        let loaded = Self::load(path)?;
        if loaded.is_stale(now, max_age) {
            Ok(Self::new(plan_name, now))
        } else {
            Ok(loaded)
        }
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}
