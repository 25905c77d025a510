use async_trait::async_trait;
use std::error::Error;
use std::path::{ Path, PathBuf };
use tokio::fs;

use super::SessionStore;
use crate::models::TeachingSession;

/// File-backed session list. The whole file is read on every load and
/// rewritten on every append; there is no partial update and no
/// transactional guarantee beyond the final write.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_sessions(&self) -> Result<Vec<TeachingSession>, Box<dyn Error + Send + Sync>> {
        if !Path::new(&self.path).exists() {
            return Ok(Vec::new());
        }
        let content = fs
            ::read_to_string(&self.path).await
            .map_err(|e| format!("Failed to read session file '{}': {}", self.path.display(), e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let sessions: Vec<TeachingSession> = serde_json
            ::from_str(&content)
            .map_err(|e| format!("Failed to parse session file '{}': {}", self.path.display(), e))?;
        Ok(sessions)
    }

    async fn write_sessions(
        &self,
        sessions: &[TeachingSession]
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e|
                    format!("Failed to create session directory '{}': {}", parent.display(), e)
                )?;
            }
        }
        let json = serde_json::to_string_pretty(sessions)?;
        fs
            ::write(&self.path, json).await
            .map_err(|e| format!("Failed to write session file '{}': {}", self.path.display(), e))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn load_all(&self) -> Result<Vec<TeachingSession>, Box<dyn Error + Send + Sync>> {
        self.read_sessions().await
    }

    async fn append(
        &self,
        session: &TeachingSession
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut sessions = self.read_sessions().await?;
        sessions.push(session.clone());
        self.write_sessions(&sessions).await
    }
}
