use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use accounting_agent::application::ports::{
    AccountingCapability, AccountingError, CommandHistoryRepository, HistoryQuery, LlmClient,
    LlmClientError, RepositoryError, TranscriptionEngine, TranscriptionError,
};
use accounting_agent::domain::{
    Account, AccountType, AccountUpdate, CommandContext, CommandHistoryEntry, CommandSource,
    NewAccount, NewTransaction, Report, ReportConfig, Transaction, TransactionFilters,
    TransactionStatus, TransactionType, TransactionUpdate,
};
use accounting_agent::presentation::config::{
    CommandSettings, CorsSettings, DatabaseSettings, FeatureSettings, LlmSettings,
    LoggingSettings, RateLimitSettings, ServerSettings, Settings, TranscriptionSettings,
};

pub fn balance_response(account_id: &str, confidence: f64) -> String {
    format!(
        r#"{{"intent": "get_account_balance", "confidence": {}, "entities": {{"accountId": "{}"}}}}"#,
        confidence, account_id
    )
}

pub fn context_for(user_id: &str) -> CommandContext {
    CommandContext::new(user_id, CommandSource::Text)
}

pub fn sample_account(id: &str) -> Account {
    let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Account {
        id: id.to_string(),
        name: "Operating".to_string(),
        account_type: AccountType::Checking,
        balance: 42.0,
        currency: "USD".to_string(),
        created_at: created,
        updated_at: created,
        last_updated: "2024-01-01".to_string(),
    }
}

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            api_version: "v1".to_string(),
            max_upload_bytes: 1024 * 1024,
        },
        llm: LlmSettings {
            api_key: "test-key".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            request_timeout_secs: 5,
            max_concurrent_requests: 2,
        },
        transcription: TranscriptionSettings {
            model: "whisper-1".to_string(),
            language: "en".to_string(),
            request_timeout_secs: 5,
        },
        commands: CommandSettings {
            min_confidence: 0.5,
            default_suggestion_limit: 3,
        },
        cors: CorsSettings {
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec!["GET".to_string(), "POST".to_string()],
            allow_credentials: false,
        },
        rate_limit: RateLimitSettings {
            window_secs: 900,
            max_requests: 1000,
            trust_forwarded_for: false,
        },
        logging: LoggingSettings {
            level: "debug".to_string(),
            json: false,
        },
        database: DatabaseSettings {
            url: None,
            max_connections: 1,
        },
        features: FeatureSettings {
            voice_commands: true,
            suggestions: true,
            history: true,
        },
    }
}

/// Returns a canned JSON completion, or fails when none is configured.
pub struct MockLlmClient {
    json_response: Option<String>,
    choices: Vec<String>,
    pub calls: AtomicUsize,
}

impl MockLlmClient {
    pub fn returning(json_response: impl Into<String>) -> Self {
        Self {
            json_response: Some(json_response.into()),
            choices: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            json_response: None,
            choices: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = choices.iter().map(|c| c.to_string()).collect();
        self
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete_json(
        &self,
        _instruction: &str,
        _input: &str,
    ) -> Result<String, LlmClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.json_response
            .clone()
            .ok_or_else(|| LlmClientError::ApiRequestFailed("model unavailable".to_string()))
    }

    async fn complete_choices(
        &self,
        _instruction: &str,
        n: usize,
    ) -> Result<Vec<String>, LlmClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.json_response.is_none() {
            return Err(LlmClientError::RateLimited);
        }
        Ok(self.choices.iter().take(n).cloned().collect())
    }
}

pub struct MockTranscriptionEngine {
    transcript: String,
    pub last_file_name: Mutex<Option<String>>,
}

impl MockTranscriptionEngine {
    pub fn new(transcript: &str) -> Self {
        Self {
            transcript: transcript.to_string(),
            last_file_name: Mutex::new(None),
        }
    }
}

#[async_trait]
impl TranscriptionEngine for MockTranscriptionEngine {
    async fn transcribe(
        &self,
        _audio_data: &[u8],
        file_name: &str,
    ) -> Result<String, TranscriptionError> {
        *self.last_file_name.lock().unwrap() = Some(file_name.to_string());
        Ok(self.transcript.clone())
    }
}

/// Accounting backend that counts calls and can be switched to fail every one.
pub struct StubAccounting {
    fail: bool,
    pub calls: AtomicUsize,
}

impl StubAccounting {
    pub fn new() -> Self {
        Self {
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> Result<(), AccountingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AccountingError::ApiRequestFailed("backend down".to_string()));
        }
        Ok(())
    }
}

fn sample_transaction(id: &str, new: NewTransaction) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: id.to_string(),
        transaction_type: new.transaction_type,
        amount: new.amount,
        description: new.description,
        category: new.category,
        date: new.date,
        account_id: new.account_id,
        status: new.status,
        metadata: new.metadata,
        created_at: now,
        updated_at: now,
    }
}

fn coffee() -> NewTransaction {
    NewTransaction {
        transaction_type: TransactionType::Expense,
        amount: 4.5,
        description: "Coffee".to_string(),
        category: "meals".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        account_id: "A1".to_string(),
        status: TransactionStatus::Completed,
        metadata: None,
    }
}

#[async_trait]
impl AccountingCapability for StubAccounting {
    async fn list_accounts(&self) -> Result<Vec<Account>, AccountingError> {
        self.enter()?;
        Ok(vec![sample_account("A1")])
    }

    async fn get_account(&self, id: &str) -> Result<Account, AccountingError> {
        self.enter()?;
        Ok(sample_account(id))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, AccountingError> {
        self.enter()?;
        let mut created = sample_account("A2");
        created.name = account.name;
        Ok(created)
    }

    async fn update_account(
        &self,
        id: &str,
        _update: AccountUpdate,
    ) -> Result<Account, AccountingError> {
        self.enter()?;
        Ok(sample_account(id))
    }

    async fn delete_account(&self, _id: &str) -> Result<(), AccountingError> {
        self.enter()
    }

    async fn list_transactions(
        &self,
        _filters: &TransactionFilters,
    ) -> Result<Vec<Transaction>, AccountingError> {
        self.enter()?;
        Ok(vec![sample_transaction("T1", coffee())])
    }

    async fn get_transaction(&self, id: &str) -> Result<Transaction, AccountingError> {
        self.enter()?;
        Ok(sample_transaction(id, coffee()))
    }

    async fn create_transaction(
        &self,
        transaction: NewTransaction,
    ) -> Result<Transaction, AccountingError> {
        self.enter()?;
        Ok(sample_transaction("T2", transaction))
    }

    async fn update_transaction(
        &self,
        id: &str,
        _update: TransactionUpdate,
    ) -> Result<Transaction, AccountingError> {
        self.enter()?;
        Ok(sample_transaction(id, coffee()))
    }

    async fn delete_transaction(&self, _id: &str) -> Result<(), AccountingError> {
        self.enter()
    }

    async fn categorize_transaction(
        &self,
        id: &str,
        category: &str,
    ) -> Result<Transaction, AccountingError> {
        self.enter()?;
        let mut transaction = sample_transaction(id, coffee());
        transaction.category = category.to_string();
        Ok(transaction)
    }

    async fn generate_report(&self, _config: &ReportConfig) -> Result<Report, AccountingError> {
        self.enter()?;
        Err(AccountingError::NotImplemented("generate_report"))
    }
}

pub struct FailingHistoryRepository;

#[async_trait]
impl CommandHistoryRepository for FailingHistoryRepository {
    async fn record(&self, _entry: &CommandHistoryEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::ConnectionFailed("database gone".to_string()))
    }

    async fn query(
        &self,
        _query: &HistoryQuery,
    ) -> Result<Vec<CommandHistoryEntry>, RepositoryError> {
        Err(RepositoryError::ConnectionFailed("database gone".to_string()))
    }
}
