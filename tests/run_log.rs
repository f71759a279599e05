//! Run Log Integration Tests
//!
//! Tests for the JSONL event format and run reconstruction.

use scenecut::core::{hash_input, stage_key, RunLog};
use scenecut::domain::{Event, EventType, Run, RunState, StageStatus};
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn test_event_log_is_jsonl() {
    let temp = TempDir::new().unwrap();
    let run_id = Uuid::new_v4();
    let log = RunLog::open(temp.path(), run_id).await.unwrap();

    log.append(&Event::new(
        run_id,
        None,
        EventType::RunStarted,
        format!("{}:start", run_id),
        "segment".to_string(),
        StageStatus::Running,
    ))
    .await
    .unwrap();
    log.append(
        &Event::new(
            run_id,
            Some("segment".to_string()),
            EventType::StageCompleted,
            stage_key(run_id, "segment", "data/script.txt"),
            "season 1: 2 episodes, 3 scenes".to_string(),
            StageStatus::Completed,
        )
        .with_duration(42),
    )
    .await
    .unwrap();

    let content = std::fs::read_to_string(log.events_path()).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);

    let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(value["event_type"], "stage_completed");
    assert_eq!(value["status"], "completed");
    assert_eq!(value["stage"], "segment");
    assert_eq!(value["duration_ms"], 42);
    assert!(value["key"]
        .as_str()
        .unwrap()
        .ends_with(&hash_input("data/script.txt")));

    // Timestamps are RFC 3339
    let timestamp = value["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn test_failed_run_reconstruction() {
    let temp = TempDir::new().unwrap();
    let run_id = Uuid::new_v4();
    let log = RunLog::open(temp.path(), run_id).await.unwrap();

    let events = vec![
        Event::new(
            run_id,
            None,
            EventType::RunStarted,
            format!("{}:start", run_id),
            "select".to_string(),
            StageStatus::Running,
        ),
        Event::new(
            run_id,
            Some("select".to_string()),
            EventType::StageStarted,
            stage_key(run_id, "select", "scene_summary.csv"),
            "Stage 'select' started".to_string(),
            StageStatus::Running,
        ),
        Event::new(
            run_id,
            Some("select".to_string()),
            EventType::StageWarning,
            format!("{}:select:warning", run_id),
            "Scene file not found: episode_9_scene_9.txt".to_string(),
            StageStatus::Running,
        ),
        Event::new(
            run_id,
            Some("select".to_string()),
            EventType::StageFailed,
            stage_key(run_id, "select", "scene_summary.csv"),
            "Stage 'select' failed".to_string(),
            StageStatus::Failed,
        )
        .with_error("Failed to open CSV file".to_string()),
        Event::new(
            run_id,
            None,
            EventType::RunFailed,
            format!("{}:failed", run_id),
            "Run failed".to_string(),
            StageStatus::Failed,
        )
        .with_error("Failed to open CSV file".to_string()),
    ];
    for event in &events {
        log.append(event).await.unwrap();
    }

    let replayed = log.replay().await.unwrap();
    assert_eq!(replayed.len(), events.len());
    for (original, read) in events.iter().zip(&replayed) {
        assert_eq!(original.id, read.id);
    }

    let run = Run::from_events(&replayed).unwrap();
    assert_eq!(run.command, "select");
    assert_eq!(run.stage_status("select"), StageStatus::Failed);
    assert_eq!(run.warnings, vec!["Scene file not found: episode_9_scene_9.txt"]);
    assert_eq!(
        run.state,
        RunState::Failed {
            error: "Failed to open CSV file".to_string()
        }
    );
    assert!(run.completed_at.is_some());

    assert_eq!(log.warnings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_recent_runs_newest_first() {
    let temp = TempDir::new().unwrap();

    let mut ids = Vec::new();
    for command in ["segment", "overview", "select"] {
        let run_id = Uuid::new_v4();
        let log = RunLog::open(temp.path(), run_id).await.unwrap();
        log.append(&Event::new(
            run_id,
            None,
            EventType::RunStarted,
            format!("{}:start", run_id),
            command.to_string(),
            StageStatus::Running,
        ))
        .await
        .unwrap();
        ids.push(run_id);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }

    let runs = RunLog::recent_runs(temp.path(), 2).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, ids[2]);
    assert_eq!(runs[0].command, "select");
    assert_eq!(runs[1].id, ids[1]);
}

#[tokio::test]
async fn test_no_runs_directory() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("runs");

    assert!(RunLog::list_runs(&missing).await.unwrap().is_empty());
    assert!(RunLog::recent_runs(&missing, 10).await.unwrap().is_empty());
}
