mod accounts;
mod commands;
mod health;
mod reports;
mod transactions;

pub use accounts::{
    account_balance_handler, account_transactions_handler, create_account_handler,
    delete_account_handler, get_account_handler, list_accounts_handler, update_account_handler,
};
pub use commands::{
    MAX_COMMAND_CHARS, history_handler, process_command_handler, suggestions_handler,
    voice_command_handler,
};
pub use health::health_handler;
pub use reports::generate_report_handler;
pub use transactions::{
    categorize_transaction_handler, create_transaction_handler, delete_transaction_handler,
    get_transaction_handler, list_transactions_handler, update_transaction_handler,
};
