use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use ethoschat_types::Role;

#[derive(Serialize)]
struct LogEntry<'a> {
    timestamp: String, // ISO-8601 Local time
    role: &'a str,
    content: &'a str,
}

/// Appends one JSONL entry per chat message under logs/
pub struct ConversationLogger {
    file_path: PathBuf,
    file: tokio::fs::File,
}

impl ConversationLogger {
    /// Create a new logger; the file name carries the local start time
    /// and the owning session id.
    pub async fn new(workspace: &Path, session_id: Uuid) -> Result<Self> {
        let logs_dir = workspace.join("logs");
        fs::create_dir_all(&logs_dir).await?;

        let now_local = Local::now();
        let filename = format!(
            "ethoschat-{}-{}.jsonl",
            now_local.format("%Y-%m-%d-%H%M%S"),
            session_id.simple()
        );
        let file_path = logs_dir.join(filename);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await?;

        Ok(Self { file_path, file })
    }

    pub async fn log(&mut self, role: Role, content: &str) -> Result<()> {
        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            role: role.as_str(),
            content,
        };

        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        self.file.write_all(line.as_bytes()).await?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}
