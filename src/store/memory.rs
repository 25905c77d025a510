use async_trait::async_trait;
use std::error::Error;
use tokio::sync::Mutex;

use super::SessionStore;
use crate::models::TeachingSession;

/// In-process store, used in tests and as a throwaway backend.
pub struct MemoryStore {
    sessions: Mutex<Vec<TeachingSession>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(Vec::new()) }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn load_all(&self) -> Result<Vec<TeachingSession>, Box<dyn Error + Send + Sync>> {
        Ok(self.sessions.lock().await.clone())
    }

    async fn append(
        &self,
        session: &TeachingSession
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.sessions.lock().await.push(session.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ Category, ChatMessage };

    #[tokio::test]
    async fn test_append_then_load() {
        let store = MemoryStore::new();
        let session = TeachingSession {
            category: Category::Language,
            messages: vec![ChatMessage::student("hello")],
            created_at: 1,
            completed: true,
        };
        store.append(&session).await.unwrap();
        let loaded = store.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].category, Category::Language);
    }
}
