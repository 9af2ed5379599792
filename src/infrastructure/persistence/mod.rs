mod in_memory_command_history_repository;
mod pg_command_history_repository;
mod pg_pool;

pub use in_memory_command_history_repository::InMemoryCommandHistoryRepository;
pub use pg_command_history_repository::PgCommandHistoryRepository;
pub use pg_pool::create_pool;
