//! Backend commands queued from UI to backend worker.

use client_core::Effect;

pub enum BackendCommand {
    /// Perform a board request and report its completion as a UI event.
    Execute(Effect),
    Shutdown,
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Execute(effect) => effect.request.name(),
            Self::Shutdown => "shutdown",
        }
    }
}
