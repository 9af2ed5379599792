mod command_dispatcher;
mod command_error;
mod command_processor;
mod entities;
mod intent_parser;

pub use command_dispatcher::CommandDispatcher;
pub use command_error::CommandProcessingError;
pub use command_processor::{CommandProcessor, MAX_SUGGESTIONS, VOICE_USER_ID};
pub use entities::Entities;
pub use intent_parser::{DEFAULT_CONFIDENCE, IntentParser, ParsingError};
