//! One conversation plus the "bot is typing" flag
//!
//! A turn is split in two so a UI can run the request on its own task:
//! [`ChatSession::begin_turn`] records the user message and raises the
//! typing flag, [`ChatSession::complete_turn`] records the outcome and lowers
//! it again.

use tracing::warn;

use crate::client::ChatClient;
use crate::error::ChatError;
use crate::state::{Conversation, Message};

/// Text of the bot record appended when a request fails for any reason.
pub const ERROR_REPLY: &str = "Error connecting to the server.";

#[derive(Debug, Default)]
pub struct ChatSession {
    conversation: Conversation,
    typing: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// True between sending a message and receiving its reply (or error).
    pub fn is_typing(&self) -> bool {
        self.typing
    }

    /// Record the user's message and mark the bot as typing.
    ///
    /// Returns the text to send, or `None` if the input is blank, in which
    /// case nothing changes.
    pub fn begin_turn(&mut self, input: &str) -> Option<String> {
        if input.trim().is_empty() {
            return None;
        }

        self.conversation.append(Message::user(input));
        self.typing = true;
        Some(input.to_string())
    }

    /// Record the outcome of the request started by `begin_turn`.
    pub fn complete_turn(&mut self, result: Result<String, ChatError>) {
        let reply = match result {
            Ok(text) => Message::bot(text),
            Err(e) => {
                warn!(error = %e, "chat request failed");
                Message::bot(ERROR_REPLY)
            }
        };
        self.conversation.append(reply);
        self.typing = false;
    }

    /// Run a whole turn against `client`. Returns false for blank input.
    pub async fn send(&mut self, client: &ChatClient, input: &str) -> bool {
        let Some(message) = self.begin_turn(input) else {
            return false;
        };
        let result = client.send(&message).await;
        self.complete_turn(result);
        true
    }
}
