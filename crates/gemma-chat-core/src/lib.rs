pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod session;
pub mod state;
pub mod transcript;

// Re-export main types for convenience
pub use client::{ChatClient, DEFAULT_ENDPOINT};
pub use config::Config;
pub use error::{ChatError, ConfigError};
pub use format::format_message;
pub use session::{ChatSession, ERROR_REPLY};
pub use state::{Conversation, Message, Sender};
