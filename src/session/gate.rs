use crate::error::SessionError;
use crate::session::budget::SessionPhase;

/// The diary text field: accepts input only while the session allows it
#[derive(Debug, Default, Clone)]
pub struct InputGate {
    draft: String,
}

impl InputGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from text left over by an earlier session
    pub fn with_draft(draft: String) -> Self {
        Self { draft }
    }

    /// Append a line of diary text if `phase` accepts input
    pub fn accept(&mut self, phase: SessionPhase, text: &str) -> Result<(), SessionError> {
        if !phase.accepts_input() {
            return Err(SessionError::InputLocked { phase });
        }

        self.draft.push_str(text);
        if !text.ends_with('\n') {
            self.draft.push('\n');
        }

        Ok(())
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn has_unsaved(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    /// Hand the draft over (to be saved) and clear the field
    pub fn take_draft(&mut self) -> String {
        std::mem::take(&mut self.draft)
    }
}
