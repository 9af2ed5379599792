use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The closed set of actions a natural-language command can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CommandIntent {
    CreateTransaction,
    UpdateTransaction,
    DeleteTransaction,
    GetTransactions,
    GetAccountBalance,
    GenerateReport,
    TaxQuery,
}

impl CommandIntent {
    pub const ALL: [CommandIntent; 7] = [
        CommandIntent::CreateTransaction,
        CommandIntent::UpdateTransaction,
        CommandIntent::DeleteTransaction,
        CommandIntent::GetTransactions,
        CommandIntent::GetAccountBalance,
        CommandIntent::GenerateReport,
        CommandIntent::TaxQuery,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandIntent::CreateTransaction => "create_transaction",
            CommandIntent::UpdateTransaction => "update_transaction",
            CommandIntent::DeleteTransaction => "delete_transaction",
            CommandIntent::GetTransactions => "get_transactions",
            CommandIntent::GetAccountBalance => "get_account_balance",
            CommandIntent::GenerateReport => "generate_report",
            CommandIntent::TaxQuery => "tax_query",
        }
    }
}

impl FromStr for CommandIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandIntent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == s)
            .ok_or_else(|| format!("Invalid intent: {}", s))
    }
}

impl TryFrom<String> for CommandIntent {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CommandIntent> for String {
    fn from(intent: CommandIntent) -> Self {
        intent.as_str().to_string()
    }
}

impl fmt::Display for CommandIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
