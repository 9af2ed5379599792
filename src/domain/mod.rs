mod account;
mod command_context;
mod command_history_entry;
mod command_intent;
mod command_result;
mod parsed_command;
mod report;
mod transaction;

pub use account::{Account, AccountBalance, AccountType, AccountUpdate, NewAccount};
pub use command_context::{CommandContext, CommandSource};
pub use command_history_entry::{CommandHistoryEntry, HistoryEntryId};
pub use command_intent::CommandIntent;
pub use command_result::{
    CommandOutcome, CommandResult, CommandResultId, CommandStatus, OutcomeError, elapsed_millis,
};
pub use parsed_command::ParsedCommand;
pub use report::{Report, ReportConfig, ReportFormat, ReportPeriod, ReportType};
pub use transaction::{
    NewTransaction, Transaction, TransactionFilters, TransactionStatus, TransactionType,
    TransactionUpdate,
};
