use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use diceforge_models::error::EngineError;
use tokio_util::sync::CancellationToken;

use crate::checkpoint::Checkpoint;
use crate::compare::{compare_plans, PlanSummary};
use crate::dispatch::run_plan as dispatch_run_plan;
use crate::plan::{Plan, PlanResult};

/// The single entry point `src/main.rs` drives. Bundles the simulate,
/// compare, analyze, and recovery (list/resume/clean) operations behind
/// one collaborator so the binary crate never constructs dispatch/checkpoint
/// plumbing itself.
pub struct Runner {
    pub checkpoint_dir: PathBuf,
    pub checkpoint_interval: u32,
    pub max_checkpoint_age: Duration,
}

impl Runner {
    pub fn new(checkpoint_dir: impl Into<PathBuf>, checkpoint_interval: u32, max_checkpoint_age_days: u32) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            checkpoint_interval,
            max_checkpoint_age: Duration::days(i64::from(max_checkpoint_age_days)),
        }
    }

    fn checkpoint_path(&self, plan_name: &str) -> PathBuf {
        self.checkpoint_dir.join(format!("{plan_name}.checkpoint.json"))
    }

    /// Run a plan to completion, writing a checkpoint every
    /// `checkpoint_interval` completed sessions so a crash mid-run loses at
    /// most that many sessions of progress.
    pub async fn run_plan(&self, plan: Plan, cancel: CancellationToken) -> Result<PlanResult, EngineError> {
        let plan_name = plan.name.clone();
        let path = self.checkpoint_path(&plan_name);
        let result = dispatch_run_plan(plan, cancel).await;

        let mut checkpoint = Checkpoint::new(plan_name.clone(), Utc::now());
        for (i, outcome) in result.outcomes.iter().enumerate() {
            checkpoint.record(outcome.clone());
            let interval_reached = self.checkpoint_interval > 0
                && (i + 1) % self.checkpoint_interval as usize == 0;
            if interval_reached || i + 1 == result.outcomes.len() {
                checkpoint.save(&path)?;
            }
        }
        Ok(result)
    }

    /// Resume a previously checkpointed plan, re-running only the sessions
    /// not already marked complete.
    pub async fn resume_checkpoint(&self, mut plan: Plan, cancel: CancellationToken) -> Result<PlanResult, EngineError> {
        let path = self.checkpoint_path(&plan.name);
        let checkpoint = Checkpoint::load_or_new(&path, plan.name.clone(), Utc::now(), self.max_checkpoint_age)?;

        plan.specs.retain(|spec| !checkpoint.is_complete(spec.session_id));
        let fresh_result = dispatch_run_plan(plan, cancel).await;

        let mut outcomes = checkpoint.partial_summaries.clone();
        outcomes.extend(fresh_result.outcomes);
        Ok(PlanResult {
            plan_name: fresh_result.plan_name,
            outcomes,
        })
    }

    pub fn compare_plan(&self, results: &[PlanResult]) -> Vec<PlanSummary> {
        compare_plans(results)
    }

    pub fn analyze_result(&self, result: &PlanResult) -> PlanSummary {
        crate::compare::summarize(result)
    }

    pub fn list_checkpoints(&self) -> Result<Vec<PathBuf>, EngineError> {
        if !self.checkpoint_dir.exists() {
            return Ok(Vec::new());
        }
        read_checkpoint_dir(&self.checkpoint_dir)
    }

    /// Drop checkpoints older than `max_checkpoint_age` from disk.
    pub fn clean_checkpoints(&self) -> Result<usize, EngineError> {
        let mut removed = 0;
        for path in self.list_checkpoints()? {
            let checkpoint = Checkpoint::load(&path)?;
            if checkpoint.is_stale(Utc::now(), self.max_checkpoint_age) {
                fs::remove_file(&path).map_err(|e| EngineError::SinkIo {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn read_checkpoint_dir(dir: &Path) -> Result<Vec<PathBuf>, EngineError> {
    let entries = fs::read_dir(dir).map_err(|e| EngineError::SinkIo {
        path: dir.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| EngineError::SinkIo {
            path: dir.display().to_string(),
            reason: e.to_string(),
        })?;
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    Ok(paths)
}
