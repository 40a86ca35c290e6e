//! UI/backend events and error modeling for the board GUI.

use client_core::Event;

pub enum UiEvent {
    /// Completion of a queued board request, fed straight into the view state.
    Board(Event),
    Info(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Request,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Status-bar line for the error.
    pub fn summary(&self) -> String {
        match (self.context, self.category) {
            (UiErrorContext::BackendStartup, UiErrorCategory::Validation) => {
                format!("Check the server URL and relaunch: {}", self.message)
            }
            (UiErrorContext::BackendStartup, _) => {
                format!("Backend worker failed to start: {}", self.message)
            }
            (UiErrorContext::Request, UiErrorCategory::Transport) => {
                format!("Server unreachable: {}", self.message)
            }
            (UiErrorContext::Request, _) => self.message.clone(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
