//! Run state and reconstruction from events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::events::{Event, EventType, StageStatus};

/// One command invocation, rebuilt from its event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    pub id: Uuid,

    /// CLI command that started the run
    pub command: String,

    pub state: RunState,

    pub started_at: DateTime<Utc>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Stage statuses in the order stages started
    pub stages: Vec<(String, StageStatus)>,

    /// Warnings raised by stages
    pub warnings: Vec<String>,
}

impl Run {
    /// Reconstruct run state from a sequence of events
    pub fn from_events(events: &[Event]) -> Option<Self> {
        let first_event = events.first()?;

        let mut run = Self {
            id: first_event.run_id,
            command: String::new(),
            state: RunState::Running,
            started_at: first_event.timestamp,
            completed_at: None,
            stages: Vec::new(),
            warnings: Vec::new(),
        };

        for event in events {
            run.apply_event(event);
        }

        Some(run)
    }

    /// Apply a single event to update run state
    pub fn apply_event(&mut self, event: &Event) {
        match event.event_type {
            EventType::RunStarted => {
                self.state = RunState::Running;
                self.started_at = event.timestamp;
                self.command = event.payload_summary.clone();
            }
            EventType::RunCompleted => {
                self.state = RunState::Completed;
                self.completed_at = Some(event.timestamp);
            }
            EventType::RunFailed => {
                self.state = RunState::Failed {
                    error: event.error.clone().unwrap_or_default(),
                };
                self.completed_at = Some(event.timestamp);
            }
            EventType::StageStarted => {
                if let Some(ref stage) = event.stage {
                    self.set_stage(stage, StageStatus::Running);
                }
            }
            EventType::StageCompleted => {
                if let Some(ref stage) = event.stage {
                    self.set_stage(stage, StageStatus::Completed);
                }
            }
            EventType::StageFailed => {
                if let Some(ref stage) = event.stage {
                    self.set_stage(stage, StageStatus::Failed);
                }
            }
            EventType::StageWarning => {
                self.warnings.push(event.payload_summary.clone());
            }
        }
    }

    fn set_stage(&mut self, stage: &str, status: StageStatus) {
        if let Some(entry) = self.stages.iter_mut().find(|(name, _)| name == stage) {
            entry.1 = status;
        } else {
            self.stages.push((stage.to_string(), status));
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, RunState::Running)
    }

    pub fn stage_status(&self, stage: &str) -> StageStatus {
        self.stages
            .iter()
            .find(|(name, _)| name == stage)
            .map(|(_, status)| *status)
            .unwrap_or_default()
    }
}

/// State of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RunState {
    Running,
    Completed,
    Failed { error: String },
}
