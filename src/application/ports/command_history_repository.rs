use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::CommandHistoryEntry;

use super::RepositoryError;

pub const DEFAULT_HISTORY_LIMIT: usize = 50;
pub const MAX_HISTORY_LIMIT: usize = 100;
/// Largest offset a Postgres `OFFSET` bind accepts.
pub const MAX_HISTORY_OFFSET: usize = i64::MAX as usize;

/// Append-only log of executed commands.
#[async_trait]
pub trait CommandHistoryRepository: Send + Sync {
    async fn record(&self, entry: &CommandHistoryEntry) -> Result<(), RepositoryError>;

    /// Entries for one user, newest first. No entries is `Ok(vec![])`.
    async fn query(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<CommandHistoryEntry>, RepositoryError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.is_none_or(|s| at >= s) && self.end.is_none_or(|e| at <= e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        Self {
            limit: limit
                .unwrap_or(DEFAULT_HISTORY_LIMIT)
                .clamp(1, MAX_HISTORY_LIMIT),
            offset: offset.unwrap_or(0).min(MAX_HISTORY_OFFSET),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub user_id: String,
    pub date_range: DateRange,
    pub pagination: Pagination,
}

impl HistoryQuery {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            date_range: DateRange::default(),
            pagination: Pagination::default(),
        }
    }
}
