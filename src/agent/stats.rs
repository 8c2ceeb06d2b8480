//! Per-run execution statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

/// Run status.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Running,
    Completed,
    Failed,
    Aborted,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Counters for one agent run. Created fresh per run and read via snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecutionStats {
    pub run_id: Uuid,
    pub total_tokens: u64,
    pub llm_calls: usize,
    pub tool_calls: usize,
    pub tool_calls_completed: usize,
    pub tool_calls_failed: usize,
    pub compressed_messages: usize,
    pub errors: Vec<String>,
    pub current_step: usize,
    pub status: RunStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ExecutionStats {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            total_tokens: 0,
            llm_calls: 0,
            tool_calls: 0,
            tool_calls_completed: 0,
            tool_calls_failed: 0,
            compressed_messages: 0,
            errors: Vec::new(),
            current_step: 0,
            status: RunStatus::Running,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Wall-clock duration in milliseconds, up to now for a running run.
    pub fn duration_ms(&self) -> i64 {
        let end = self.finished_at.unwrap_or_else(Utc::now);
        (end - self.started_at).num_milliseconds()
    }

    pub(crate) fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.finished_at = Some(Utc::now());
    }
}

impl Default for ExecutionStats {
    fn default() -> Self {
        Self::new(Uuid::nil())
    }
}
