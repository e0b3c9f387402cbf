use chrono::{DateTime, Local};

const MAX_MESSAGES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "buddy",
            Role::System => "system",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

/// The conversation pane: commentary, user questions and status lines,
/// oldest first.
#[derive(Debug)]
pub struct Transcript {
    messages: Vec<Message>,
    pub input: String,
    pub composing: bool,
    pub scroll_offset: u16,
}

impl Default for Transcript {
    fn default() -> Self {
        let mut transcript = Self {
            messages: Vec::new(),
            input: String::new(),
            composing: false,
            scroll_offset: 0,
        };
        transcript.push_system("Pick a game from the schedule to get started.");
        transcript
    }
}

impl Transcript {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.push(Role::User, text.into());
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.push(Role::Assistant, text.into());
    }

    /// Status lines repeat a lot (network retries); collapse back-to-back copies.
    pub fn push_system(&mut self, text: impl Into<String>) {
        let text = text.into();
        if let Some(last) = self.messages.last()
            && last.role == Role::System
            && last.text == text
        {
            return;
        }
        self.push(Role::System, text);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.scroll_offset = 0;
    }

    /// Take the composed line, if any, and leave compose mode.
    pub fn submit_input(&mut self) -> Option<String> {
        let text = self.input.trim().to_string();
        self.composing = false;
        self.input.clear();
        if text.is_empty() {
            return None;
        }
        self.push_user(text.clone());
        Some(text)
    }

    pub fn cancel_input(&mut self) {
        self.composing = false;
        self.input.clear();
    }

    pub fn scroll_up(&mut self) {
        let max = self.messages.len().saturating_sub(1) as u16;
        self.scroll_offset = (self.scroll_offset + 1).min(max);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    fn push(&mut self, role: Role, text: String) {
        self.messages.push(Message { role, text, timestamp: Local::now() });
        if self.messages.len() > MAX_MESSAGES {
            let remove_count = self.messages.len() - MAX_MESSAGES;
            self.messages.drain(0..remove_count);
        }
        self.scroll_offset = 0;
    }
}
