mod json_file;
mod memory;

use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use crate::cli::Args;
use crate::models::{ Category, TeachingSession };

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// Append-only store for completed teaching sessions. There is no update
/// and no delete; filtering happens client-side over the loaded list.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<TeachingSession>, Box<dyn Error + Send + Sync>>;

    async fn append(
        &self,
        session: &TeachingSession
    ) -> Result<(), Box<dyn Error + Send + Sync>>;
}

pub fn create_session_store(
    args: &Args
) -> Result<Arc<dyn SessionStore>, Box<dyn Error + Send + Sync>> {
    match args.store_type.to_lowercase().as_str() {
        "json" => {
            info!("Teaching sessions will be stored in: {}", args.sessions_path);
            Ok(Arc::new(JsonFileStore::new(args.sessions_path.clone())))
        }
        "memory" => Ok(Arc::new(MemoryStore::new())),
        _ =>
            Err(
                Box::new(
                    std::io::Error::new(
                        std::io::ErrorKind::InvalidInput,
                        format!("Unsupported session store type: {}", args.store_type)
                    )
                )
            ),
    }
}

/// Client-side category filter over a loaded session list.
pub fn filter_by_category(
    sessions: &[TeachingSession],
    category: Option<Category>
) -> Vec<TeachingSession> {
    match category {
        Some(cat) => sessions
            .iter()
            .filter(|s| s.category == cat)
            .cloned()
            .collect(),
        None => sessions.to_vec(),
    }
}

/// Session counts per category, for the history overview.
pub fn category_tallies(sessions: &[TeachingSession]) -> HashMap<Category, usize> {
    let mut tallies = HashMap::new();
    for session in sessions {
        *tallies.entry(session.category).or_insert(0) += 1;
    }
    tallies
}
