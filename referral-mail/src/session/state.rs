//! Session states

use crate::mailer::Attachment;
use crate::templates::Template;

/// Working copy of one referral message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    /// Copy of the selected template, never a live reference into the store
    pub template: Template,
    pub subject: String,
    pub body: String,
    pub recipient: String,
    pub attachment: Option<Attachment>,
}

impl Draft {
    pub fn from_template(template: Template) -> Self {
        Self {
            subject: template.subject.clone(),
            body: template.body.clone(),
            template,
            recipient: String::new(),
            attachment: None,
        }
    }
}

/// Subject and body with placeholders filled
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No template selected
    #[default]
    Empty,
    /// Template selected, fields editable
    Composing(Draft),
    /// Read-only rendered view of the draft
    Previewing { draft: Draft, rendered: Rendered },
    /// Dispatch in flight
    Sending(Draft),
}

/// Field-free tag of a [`SessionState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Empty,
    Composing,
    Previewing,
    Sending,
}

impl SessionState {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionState::Empty => SessionPhase::Empty,
            SessionState::Composing(_) => SessionPhase::Composing,
            SessionState::Previewing { .. } => SessionPhase::Previewing,
            SessionState::Sending(_) => SessionPhase::Sending,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match self {
            SessionState::Empty => None,
            SessionState::Composing(draft)
            | SessionState::Previewing { draft, .. }
            | SessionState::Sending(draft) => Some(draft),
        }
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Empty => write!(f, "empty"),
            SessionPhase::Composing => write!(f, "composing"),
            SessionPhase::Previewing => write!(f, "previewing"),
            SessionPhase::Sending => write!(f, "sending"),
        }
    }
}
