use crate::common::{EventEnvelope, EventStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Replay store keeping one JSON Lines file per game.
///
/// Each line is an [`EventEnvelope`]; appending never rewrites earlier lines,
/// so a replay of an interrupted match is still readable up to its last turn.
pub struct FileReplayStore {
    base_path: PathBuf,
}

impl FileReplayStore {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the replay file for a game.
    pub fn replay_path(&self, game_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", game_id))
    }

    async fn ensure_base_dir(&self) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("Failed to create replay directory {}: {}", self.base_path.display(), e))
    }

    async fn read_file(path: &Path) -> Result<Vec<EventEnvelope>, String> {
        let file = File::open(path)
            .await
            .map_err(|e| format!("Failed to open replay file {}: {}", path.display(), e))?;

        let mut lines = BufReader::new(file).lines();
        let mut envelopes = Vec::new();
        let mut line_number = 0u64;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read line: {}", e))?
        {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let envelope: EventEnvelope = serde_json::from_str(&line).map_err(|e| {
                format!("Failed to deserialize event at {}:{}: {}", path.display(), line_number, e)
            })?;
            envelopes.push(envelope);
        }

        Ok(envelopes)
    }
}

#[async_trait]
impl EventStore for FileReplayStore {
    async fn append_events(&self, aggregate_id: &str, events: Vec<EventEnvelope>) -> Result<(), String> {
        if events.is_empty() {
            return Ok(());
        }
        self.ensure_base_dir().await?;

        let path = self.replay_path(aggregate_id);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| format!("Failed to open replay file {}: {}", path.display(), e))?;

        let mut buffer = String::new();
        for event in &events {
            let line = serde_json::to_string(event).map_err(|e| format!("Failed to serialize event: {}", e))?;
            buffer.push_str(&line);
            buffer.push('\n');
        }

        file.write_all(buffer.as_bytes())
            .await
            .map_err(|e| format!("Failed to write events: {}", e))?;
        file.flush().await.map_err(|e| format!("Failed to flush replay file: {}", e))?;

        Ok(())
    }

    /// `from_version` is the number of leading events to skip.
    async fn load_events(&self, aggregate_id: &str, from_version: u64) -> Result<Vec<EventEnvelope>, String> {
        let path = self.replay_path(aggregate_id);
        if !path.exists() {
            return Ok(vec![]);
        }

        let envelopes = Self::read_file(&path).await?;
        Ok(envelopes.into_iter().skip(from_version as usize).collect())
    }

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Vec<EventEnvelope>, String> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let mut dir = tokio::fs::read_dir(&self.base_path)
            .await
            .map_err(|e| format!("Failed to read directory: {}", e))?;

        let mut matching = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read directory entry: {}", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
                continue;
            }
            matching.extend(Self::read_file(&path).await?.into_iter().filter(|envelope| {
                envelope.event_type == event_type
                    && from_timestamp.map_or(true, |from| envelope.occurred_at >= from)
            }));
        }

        matching.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(matching)
    }
}
