use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;
use uuid::Uuid;

use crate::application::ports::{CommandHistoryRepository, HistoryQuery, RepositoryError};
use crate::domain::{CommandHistoryEntry, CommandResult, HistoryEntryId, ParsedCommand};

type HistoryRow = (
    Uuid,
    String,
    Json<ParsedCommand>,
    Json<CommandResult>,
    DateTime<Utc>,
);

pub struct PgCommandHistoryRepository {
    pool: PgPool,
}

impl PgCommandHistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommandHistoryRepository for PgCommandHistoryRepository {
    #[instrument(skip(self, entry), fields(entry_id = %entry.id.as_uuid(), user_id = %entry.user_id))]
    async fn record(&self, entry: &CommandHistoryEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO command_history (id, user_id, command, result, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(&entry.user_id)
        .bind(Json(&entry.command))
        .bind(Json(&entry.result))
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %query.user_id))]
    async fn query(
        &self,
        query: &HistoryQuery,
    ) -> Result<Vec<CommandHistoryEntry>, RepositoryError> {
        let limit = i64::try_from(query.pagination.limit)
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;
        let offset = i64::try_from(query.pagination.offset)
            .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        let rows: Vec<HistoryRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, command, result, created_at
            FROM command_history
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&query.user_id)
        .bind(query.date_range.start)
        .bind(query.date_range.end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| RepositoryError::QueryFailed(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|(id, user_id, command, result, created_at)| CommandHistoryEntry {
                id: HistoryEntryId::from_uuid(id),
                user_id,
                command: command.0,
                result: result.0,
                timestamp: created_at,
            })
            .collect())
    }
}
