use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::application::ports::{CommandHistoryRepository, HistoryQuery, RepositoryError};
use crate::domain::CommandHistoryEntry;

/// Non-durable history used when no database is configured.
#[derive(Default)]
pub struct InMemoryCommandHistoryRepository {
    entries: RwLock<Vec<CommandHistoryEntry>>,
}

impl InMemoryCommandHistoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandHistoryRepository for InMemoryCommandHistoryRepository {
    async fn record(&self, entry: &CommandHistoryEntry) -> Result<(), RepositoryError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }

    async fn query(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<CommandHistoryEntry>, RepositoryError> {
        let entries = self.entries.read().await;
        let mut matching: Vec<&CommandHistoryEntry> = entries
            .iter()
            .filter(|e| e.user_id == query.user_id && query.date_range.contains(e.timestamp))
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(matching
            .into_iter()
            .skip(query.pagination.offset)
            .take(query.pagination.limit)
            .cloned()
            .collect())
    }
}
