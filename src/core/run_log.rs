//! Append-only run log with file-based persistence.
//!
//! Events are stored as newline-delimited JSON (JSONL), one directory per
//! run below the output root's `runs/` directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use uuid::Uuid;

use crate::domain::{Event, EventType, Run};

/// File-based run log using JSONL format
#[derive(Debug)]
pub struct RunLog {
    run_id: Uuid,
    events_path: PathBuf,
}

impl RunLog {
    /// Create or open the log for a run below `runs_dir`
    pub async fn open(runs_dir: &Path, run_id: Uuid) -> Result<Self> {
        let run_dir = runs_dir.join(run_id.to_string());

        fs::create_dir_all(&run_dir)
            .await
            .with_context(|| format!("Failed to create run directory: {}", run_dir.display()))?;

        let events_path = run_dir.join("events.jsonl");

        Ok(Self { run_id, events_path })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }


    /// Append an event to the log
    pub async fn append(&self, event: &Event) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.events_path)
            .await
            .with_context(|| format!("Failed to open events file: {}", self.events_path.display()))?;

        let json = serde_json::to_string(event).context("Failed to serialize event")?;
        file.write_all(format!("{}\n", json).as_bytes())
            .await
            .context("Failed to write event")?;
        file.flush().await.context("Failed to flush event")?;

        Ok(())
    }

    /// Replay all events in order
    pub async fn replay(&self) -> Result<Vec<Event>> {
        if !self.events_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.events_path)
            .await
            .with_context(|| format!("Failed to open events file: {}", self.events_path.display()))?;

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut events = Vec::new();

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event: Event = serde_json::from_str(&line)
                .with_context(|| format!("Failed to parse event: {}", line))?;
            events.push(event);
        }

        Ok(events)
    }

    /// Warnings recorded so far
    pub async fn warnings(&self) -> Result<Vec<Event>> {
        let events = self.replay().await?;
        Ok(events
            .into_iter()
            .filter(|e| e.event_type == EventType::StageWarning)
            .collect())
    }

    /// List all run IDs below `runs_dir`
    pub async fn list_runs(runs_dir: &Path) -> Result<Vec<Uuid>> {
        if !runs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut runs = Vec::new();
        let mut entries = fs::read_dir(runs_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Ok(uuid) = Uuid::parse_str(name) {
                        runs.push(uuid);
                    }
                }
            }
        }

        Ok(runs)
    }

    /// Load runs below `runs_dir`, newest first
    pub async fn recent_runs(runs_dir: &Path, limit: usize) -> Result<Vec<Run>> {
        let mut runs = Vec::new();

        for run_id in Self::list_runs(runs_dir).await? {
            let log = Self::at(runs_dir, run_id);
            if let Some(run) = Run::from_events(&log.replay().await?) {
                runs.push(run);
            }
        }

        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        runs.truncate(limit);
        Ok(runs)
    }

    /// Rebuild one run from its log
    pub async fn load_run(runs_dir: &Path, run_id: Uuid) -> Result<Run> {
        let log = Self::at(runs_dir, run_id);
        if !log.events_path.exists() {
            anyhow::bail!("No events found for run {}", run_id);
        }
        let events = log.replay().await?;
        Run::from_events(&events).with_context(|| format!("Run {} has an empty event log", run_id))
    }

    /// Handle on an existing run directory without creating it
    fn at(runs_dir: &Path, run_id: Uuid) -> Self {
        Self {
            run_id,
            events_path: runs_dir.join(run_id.to_string()).join("events.jsonl"),
        }
    }
}

/// Generate the key recorded on a stage's events
pub fn stage_key(run_id: Uuid, stage: &str, input: &str) -> String {
    format!("{}:{}:{}", run_id, stage, hash_input(input))
}

/// Hash input content (first 16 hex chars of SHA256)
pub fn hash_input(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(&digest[..8])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StageStatus;
    use tempfile::TempDir;

    fn event(run_id: Uuid, stage: Option<&str>, event_type: EventType) -> Event {
        Event::new(
            run_id,
            stage.map(str::to_string),
            event_type,
            format!("{}:key", run_id),
            "summary".to_string(),
            StageStatus::Running,
        )
    }

    #[tokio::test]
    async fn test_event_append_and_replay() {
        let temp = TempDir::new().unwrap();
        let run_id = Uuid::new_v4();
        let log = RunLog::open(temp.path(), run_id).await.unwrap();

        log.append(&event(run_id, None, EventType::RunStarted)).await.unwrap();
        log.append(&event(run_id, Some("segment"), EventType::StageStarted))
            .await
            .unwrap();

        let events = log.replay().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, EventType::RunStarted);
        assert_eq!(events[1].stage.as_deref(), Some("segment"));
        assert!(log.events_path().starts_with(temp.path()));
    }

    #[tokio::test]
    async fn test_replay_missing_log() {
        let temp = TempDir::new().unwrap();
        let log = RunLog::at(temp.path(), Uuid::new_v4());
        assert!(log.replay().await.unwrap().is_empty());
        assert!(RunLog::load_run(temp.path(), log.run_id()).await.is_err());
    }

    #[tokio::test]
    async fn test_list_and_load_runs() {
        let temp = TempDir::new().unwrap();
        let run_id = Uuid::new_v4();
        let log = RunLog::open(temp.path(), run_id).await.unwrap();
        log.append(&event(run_id, None, EventType::RunStarted)).await.unwrap();
        log.append(&event(run_id, None, EventType::RunCompleted)).await.unwrap();

        // Stray entries are ignored
        std::fs::create_dir_all(temp.path().join("not-a-run")).unwrap();

        assert_eq!(RunLog::list_runs(temp.path()).await.unwrap(), vec![run_id]);

        let runs = RunLog::recent_runs(temp.path(), 10).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, run_id);

        let run = RunLog::load_run(temp.path(), run_id).await.unwrap();
        assert!(!run.is_running());
    }

    #[test]
    fn test_stage_key_format() {
        let run_id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let key = stage_key(run_id, "segment", "script text");

        assert!(key.starts_with("550e8400-e29b-41d4-a716-446655440000:segment:"));
        let parts: Vec<&str> = key.split(':').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 16);
    }

    #[test]
    fn test_input_hash_consistency() {
        assert_eq!(hash_input("a"), hash_input("a"));
        assert_ne!(hash_input("a"), hash_input("b"));
        assert_eq!(hash_input("a").len(), 16);
    }
}
