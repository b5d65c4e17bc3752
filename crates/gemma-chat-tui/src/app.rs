use gemma_chat_core::{ChatClient, ChatError, ChatSession};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    Checking,
    Reachable,
    Unreachable,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub struct App {
    pub should_quit: bool,
    pub session: ChatSession,
    pub client: ChatClient,
    pub server_status: ServerStatus,

    // Input line
    pub input: String,
    pub cursor: usize,

    // Chat view; `max_scroll` and `chat_area` are written by the renderer
    pub scroll: u16,
    pub follow_bottom: bool,
    pub max_scroll: u16,
    pub chat_height: u16,
    pub chat_area: Option<Rect>,

    // Typing indicator frame: 0..=2 extra dots
    pub animation_frame: u8,

    pending: Option<JoinHandle<Result<String, ChatError>>>,
    ping_task: Option<JoinHandle<bool>>,
}

impl App {
    pub fn new(client: ChatClient) -> Self {
        Self {
            should_quit: false,
            session: ChatSession::new(),
            client,
            server_status: ServerStatus::Checking,
            input: String::new(),
            cursor: 0,
            scroll: 0,
            follow_bottom: true,
            max_scroll: 0,
            chat_height: 0,
            chat_area: None,
            animation_frame: 0,
            pending: None,
            ping_task: None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some()
    }

    /// Send the current input. Ignored while a reply is outstanding.
    pub fn submit(&mut self) {
        if self.pending.is_some() {
            debug!("ignoring submit while a request is in flight");
            return;
        }

        let Some(message) = self.session.begin_turn(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor = 0;
        self.animation_frame = 0;
        self.follow_bottom = true;

        let client = self.client.clone();
        self.pending = Some(tokio::spawn(async move { client.send(&message).await }));
    }

    /// Collect a finished request, if any. Returns true when the
    /// conversation changed.
    pub async fn poll_pending(&mut self) -> bool {
        if !self.pending.as_ref().is_some_and(JoinHandle::is_finished) {
            return false;
        }
        let Some(handle) = self.pending.take() else {
            return false;
        };

        let result = handle
            .await
            .unwrap_or_else(|e| Err(ChatError::Aborted(e.to_string())));
        self.session.complete_turn(result);
        self.follow_bottom = true;
        true
    }

    pub fn start_ping(&mut self) {
        let client = self.client.clone();
        self.server_status = ServerStatus::Checking;
        self.ping_task = Some(tokio::spawn(async move { client.ping().await }));
    }

    pub async fn poll_ping(&mut self) {
        if !self.ping_task.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }
        if let Some(handle) = self.ping_task.take() {
            let reachable = handle.await.unwrap_or(false);
            info!(endpoint = %self.client.endpoint(), reachable, "server check finished");
            self.server_status = if reachable {
                ServerStatus::Reachable
            } else {
                ServerStatus::Unreachable
            };
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.session.is_typing() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.cursor);
        self.input.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor = self.input.chars().count();
    }

    pub fn scroll_up(&mut self, lines: u16) {
        if self.follow_bottom {
            self.scroll = self.max_scroll;
        }
        self.follow_bottom = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
        if self.scroll >= self.max_scroll {
            self.scroll = self.max_scroll;
            self.follow_bottom = true;
        }
    }

    pub fn page_size(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }
}
