use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use diceforge_models::error::EngineError;
use diceforge_models::events::Event;
use tracing::warn;

/// Which top-level subtree a log file belongs to. Classification is
/// mechanical and advisory only — it groups files for humans browsing the
/// log root, it never changes what gets written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    Simulations,
    Strategies,
    Sessions,
    Analysis,
}

impl LogCategory {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Simulations => "simulations",
            Self::Strategies => "strategies",
            Self::Sessions => "sessions",
            Self::Analysis => "analysis",
        }
    }
}

/// `composite.*` and `adaptive.*` strategy names get their own subclass;
/// every other strategy (flat, martingale, fibonacci, dalembert, paroli,
/// parking-wrapped variants) falls under `basic`.
pub fn classify_strategy(strategy_name: &str) -> &'static str {
    if strategy_name.starts_with("composite") {
        "composite"
    } else if strategy_name.starts_with("adaptive") {
        "adaptive"
    } else {
        "basic"
    }
}

pub fn log_path(root: &Path, category: LogCategory, subclass: &str, name: &str, timestamp: DateTime<Utc>) -> PathBuf {
    root.join(category.dir_name())
        .join(subclass)
        .join(format!("{name}_{}.jsonl", timestamp.format("%Y%m%dT%H%M%SZ")))
}

/// One append-only JSONL writer, one per worker to avoid lock contention
/// between sessions running on separate `spawn_blocking` threads. Buffers
/// internally; must be flushed at session end per the sink contract.
pub struct LogSink {
    path: PathBuf,
    writer: BufWriter<File>,
    warned_once: bool,
}

impl LogSink {
    pub fn create(path: PathBuf) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| EngineError::SinkIo {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| EngineError::SinkIo {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            warned_once: false,
        })
    }

    /// Append one event as a JSON line. A write failure is non-fatal to the
    /// session — it drops the event and logs a single warning per sink
    /// lifetime, never one per dropped event, to avoid a log storm.
    pub fn write_event(&mut self, event: &Event) {
        let line = match serde_json::to_string(event) {
            Ok(line) => line,
            Err(_) => return,
        };
        if let Err(e) = writeln!(self.writer, "{line}") {
            if !self.warned_once {
                warn!(path = %self.path.display(), error = %e, "dropping event after sink write failure");
                self.warned_once = true;
            }
        }
    }

    pub fn flush(&mut self) -> Result<(), EngineError> {
        self.writer.flush().map_err(|e| EngineError::SinkIo {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diceforge_models::money::Money;
    use rust_decimal_macros::dec;

    #[test]
    fn classify_strategy_routes_by_prefix() {
        assert_eq!(classify_strategy("composite"), "composite");
        assert_eq!(classify_strategy("adaptive"), "adaptive");
        assert_eq!(classify_strategy("martingale"), "basic");
        assert_eq!(classify_strategy("flat"), "basic");
    }

    #[test]
    fn log_path_builds_hierarchy() {
        let root = Path::new("/tmp/diceforge-logs");
        let now = Utc::now();
        let path = log_path(root, LogCategory::Strategies, "adaptive", "worker-0", now);
        assert!(path.starts_with(root.join("strategies").join("adaptive")));
        assert!(path.extension().unwrap() == "jsonl");
    }

    #[test]
    fn write_event_appends_jsonl_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sessions").join("worker-0.jsonl");
        let mut sink = LogSink::create(path.clone()).unwrap();
        sink.write_event(&Event::new(None, diceforge_models::events::EventKind::StrategyToggle));
        sink.write_event(&Event::new(
            None,
            diceforge_models::events::EventKind::BetPlaced {
                amount: Money::new(dec!(1)),
                multiplier: 2.0,
                bet_type: diceforge_models::bet::BetType::Under,
                nonce: 1,
            },
        ));
        sink.flush().unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
