//! Events that drive a dialogue

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    UserUtterance { text: String },
    AssessmentRequested,

    // Model events
    ClarificationReceived { text: String },
    ClarificationFailed { message: String },
    AssessmentReceived { text: String },
}

impl Event {
    pub fn utterance(text: impl Into<String>) -> Self {
        Event::UserUtterance { text: text.into() }
    }

    pub fn clarification(text: impl Into<String>) -> Self {
        Event::ClarificationReceived { text: text.into() }
    }
}
