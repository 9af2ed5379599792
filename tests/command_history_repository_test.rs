mod helpers;

use chrono::{Duration, Utc};
use serde_json::{Map, json};

use accounting_agent::application::ports::{
    CommandHistoryRepository, DateRange, HistoryQuery, MAX_HISTORY_OFFSET, Pagination,
};
use accounting_agent::domain::{
    CommandHistoryEntry, CommandIntent, CommandResult, ParsedCommand,
};
use accounting_agent::infrastructure::persistence::InMemoryCommandHistoryRepository;

use helpers::{TestPostgres, context_for};

fn entry(user_id: &str, text: &str, hours_ago: i64) -> CommandHistoryEntry {
    let command = ParsedCommand::new(
        text.to_string(),
        CommandIntent::GetTransactions,
        0.9,
        Map::new(),
        context_for(user_id),
    );
    let mut entry =
        CommandHistoryEntry::from_result(&CommandResult::completed(command, json!([])));
    entry.timestamp = Utc::now() - Duration::hours(hours_ago);
    entry
}

async fn seed(repository: &dyn CommandHistoryRepository) {
    for e in [
        entry("user-1", "oldest", 3),
        entry("user-1", "newest", 1),
        entry("user-1", "middle", 2),
        entry("user-2", "someone else", 1),
    ] {
        repository.record(&e).await.unwrap();
    }
}

fn texts(entries: &[CommandHistoryEntry]) -> Vec<&str> {
    entries
        .iter()
        .map(|e| e.command.original_text.as_str())
        .collect()
}

async fn assert_newest_first(repository: &dyn CommandHistoryRepository) {
    seed(repository).await;

    let entries = repository
        .query(&HistoryQuery::for_user("user-1"))
        .await
        .unwrap();

    assert_eq!(texts(&entries), vec!["newest", "middle", "oldest"]);
}

async fn assert_paginated_and_ranged(repository: &dyn CommandHistoryRepository) {
    seed(repository).await;

    let page = repository
        .query(&HistoryQuery {
            pagination: Pagination::new(Some(1), Some(1)),
            ..HistoryQuery::for_user("user-1")
        })
        .await
        .unwrap();
    let ranged = repository
        .query(&HistoryQuery {
            date_range: DateRange {
                start: Some(Utc::now() - Duration::minutes(150)),
                end: None,
            },
            ..HistoryQuery::for_user("user-1")
        })
        .await
        .unwrap();

    assert_eq!(texts(&page), vec!["middle"]);
    assert_eq!(texts(&ranged), vec!["newest", "middle"]);
}

#[tokio::test]
async fn given_entries_when_querying_in_memory_then_newest_first_for_user() {
    assert_newest_first(&InMemoryCommandHistoryRepository::new()).await;
}

#[tokio::test]
async fn given_entries_when_paging_in_memory_then_window_and_range_applied() {
    assert_paginated_and_ranged(&InMemoryCommandHistoryRepository::new()).await;
}

#[tokio::test]
async fn given_unknown_user_when_querying_in_memory_then_empty() {
    let repository = InMemoryCommandHistoryRepository::new();

    let entries = repository
        .query(&HistoryQuery::for_user("ghost"))
        .await
        .unwrap();

    assert!(entries.is_empty());
}

#[tokio::test]
async fn given_offset_beyond_i64_when_paging_then_clamped_and_empty() {
    let pagination = Pagination::new(None, Some(usize::MAX));
    assert_eq!(pagination.offset, MAX_HISTORY_OFFSET);
    assert!(i64::try_from(pagination.offset).is_ok());

    let repository = InMemoryCommandHistoryRepository::new();
    seed(&repository).await;
    let query = HistoryQuery {
        pagination,
        ..HistoryQuery::for_user("user-1")
    };

    let entries = repository.query(&query).await.unwrap();

    assert!(entries.is_empty());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_entries_when_querying_postgres_then_newest_first_for_user() {
    let test_pg = TestPostgres::new().await;

    assert_newest_first(&test_pg.history_repository).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_entries_when_paging_postgres_then_window_and_range_applied() {
    let test_pg = TestPostgres::new().await;

    assert_paginated_and_ranged(&test_pg.history_repository).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn given_recorded_entry_when_reading_back_from_postgres_then_round_trips() {
    let test_pg = TestPostgres::new().await;
    let original = entry("user-1", "balance of A1", 0);

    test_pg.history_repository.record(&original).await.unwrap();
    let entries = test_pg
        .history_repository
        .query(&HistoryQuery::for_user("user-1"))
        .await
        .unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, original.id);
    assert_eq!(entries[0].command, original.command);
    assert_eq!(entries[0].result.status, original.result.status);
}
