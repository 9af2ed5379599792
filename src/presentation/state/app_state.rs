use std::sync::Arc;

use crate::application::ports::AccountingCapability;
use crate::application::services::CommandProcessor;
use crate::presentation::config::{Environment, Settings};

/// Shared by every handler; services are built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub command_processor: Arc<CommandProcessor>,
    pub accounting: Arc<dyn AccountingCapability>,
    pub settings: Arc<Settings>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(
        command_processor: Arc<CommandProcessor>,
        accounting: Arc<dyn AccountingCapability>,
        settings: Settings,
        environment: Environment,
    ) -> Self {
        Self {
            command_processor,
            accounting,
            settings: Arc::new(settings),
            environment,
        }
    }
}
