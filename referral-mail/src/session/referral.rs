//! Referral session state machine

use crate::error::{Result, ValidationError};
use crate::mailer::{Attachment, Mailer, OutboundEmail};
use crate::session::state::{Draft, Rendered, SessionPhase, SessionState};
use crate::templates::{PlaceholderSet, Template};
use tracing::{debug, info, warn};

/// One compose-to-send cycle, owned by a single interactive client
///
/// The placeholder key set is fixed when the session is created and survives
/// every reset; only the values change.
#[derive(Debug, Clone)]
pub struct ReferralSession {
    placeholders: PlaceholderSet,
    state: SessionState,
}

impl Default for ReferralSession {
    fn default() -> Self {
        Self::new(PlaceholderSet::referral_defaults())
    }
}

impl ReferralSession {
    pub fn new(placeholders: PlaceholderSet) -> Self {
        Self {
            placeholders,
            state: SessionState::Empty,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.state.draft()
    }

    pub fn placeholders(&self) -> &PlaceholderSet {
        &self.placeholders
    }

    pub fn is_sending(&self) -> bool {
        matches!(self.state, SessionState::Sending(_))
    }

    /// Copy `template` into fresh working fields and clear placeholder values
    ///
    /// Recipient and attachment carry over when switching templates mid-edit.
    pub fn select_template(&mut self, template: Template) -> std::result::Result<(), ValidationError> {
        if self.is_sending() {
            return Err(ValidationError::SendInProgress);
        }

        let mut draft = Draft::from_template(template);
        match std::mem::take(&mut self.state) {
            SessionState::Composing(previous) | SessionState::Previewing { draft: previous, .. } => {
                draft.recipient = previous.recipient;
                draft.attachment = previous.attachment;
            }
            SessionState::Empty | SessionState::Sending(_) => {}
        }

        info!(template_id = %draft.template.id, name = %draft.template.name, "Template selected");

        self.placeholders.clear_values();
        self.state = SessionState::Composing(draft);
        Ok(())
    }

    pub fn set_placeholder(
        &mut self,
        key: &str,
        value: impl Into<String>,
    ) -> std::result::Result<(), ValidationError> {
        self.composing_mut()?;
        self.placeholders.set(key, value)
    }

    pub fn set_recipient(&mut self, recipient: impl Into<String>) -> std::result::Result<(), ValidationError> {
        self.composing_mut()?.recipient = recipient.into();
        Ok(())
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> std::result::Result<(), ValidationError> {
        self.composing_mut()?.subject = subject.into();
        Ok(())
    }

    pub fn set_body(&mut self, body: impl Into<String>) -> std::result::Result<(), ValidationError> {
        self.composing_mut()?.body = body.into();
        Ok(())
    }

    /// Replaces any previous attachment; one file per message
    pub fn attach(&mut self, attachment: Attachment) -> std::result::Result<(), ValidationError> {
        self.composing_mut()?.attachment = Some(attachment);
        Ok(())
    }

    pub fn remove_attachment(&mut self) -> std::result::Result<Option<Attachment>, ValidationError> {
        Ok(self.composing_mut()?.attachment.take())
    }

    /// Working fields with the current values filled in
    pub fn render(&self) -> Option<Rendered> {
        self.draft().map(|draft| self.render_draft(draft))
    }

    /// Switch to the read-only rendered view
    pub fn preview(&mut self) -> std::result::Result<&Rendered, ValidationError> {
        self.state = match std::mem::take(&mut self.state) {
            SessionState::Composing(draft) => {
                let rendered = self.render_draft(&draft);
                debug!(template_id = %draft.template.id, "Previewing draft");
                SessionState::Previewing { draft, rendered }
            }
            previewing @ SessionState::Previewing { .. } => previewing,
            SessionState::Empty => return Err(ValidationError::NoTemplateSelected),
            SessionState::Sending(draft) => {
                self.state = SessionState::Sending(draft);
                return Err(ValidationError::SendInProgress);
            }
        };

        match &self.state {
            SessionState::Previewing { rendered, .. } => Ok(rendered),
            _ => Err(ValidationError::NoTemplateSelected),
        }
    }

    /// Leave the preview; working fields were never touched by it
    pub fn back_to_edit(&mut self) -> std::result::Result<(), ValidationError> {
        self.state = match std::mem::take(&mut self.state) {
            SessionState::Previewing { draft, .. } | SessionState::Composing(draft) => {
                SessionState::Composing(draft)
            }
            SessionState::Empty => return Err(ValidationError::NoTemplateSelected),
            SessionState::Sending(draft) => {
                self.state = SessionState::Sending(draft);
                return Err(ValidationError::SendInProgress);
            }
        };
        Ok(())
    }

    /// Check the send guard and enter `Sending`
    ///
    /// Every placeholder whose `{key}` appears in the body needs a value.
    /// On success the returned message is fully resolved and the session
    /// rejects further sends until [`finish_send`](Self::finish_send).
    pub fn begin_send(&mut self) -> std::result::Result<OutboundEmail, ValidationError> {
        let draft = match &self.state {
            SessionState::Sending(_) => return Err(ValidationError::SendInProgress),
            SessionState::Empty => return Err(ValidationError::NoTemplateSelected),
            SessionState::Composing(draft) | SessionState::Previewing { draft, .. } => draft,
        };

        if draft.recipient.trim().is_empty() {
            return Err(ValidationError::MissingRecipient);
        }

        let missing = self.placeholders.missing_in(&draft.body);
        if !missing.is_empty() {
            return Err(ValidationError::MissingPlaceholders(missing));
        }

        let rendered = self.render_draft(draft);
        let email = OutboundEmail {
            recipient: draft.recipient.trim().to_string(),
            subject: rendered.subject,
            body_html: rendered.body,
            attachment: draft.attachment.clone(),
        };

        self.state = match std::mem::take(&mut self.state) {
            SessionState::Composing(draft) | SessionState::Previewing { draft, .. } => {
                SessionState::Sending(draft)
            }
            other => other,
        };

        debug!(recipient = %email.recipient, "Send started");
        Ok(email)
    }

    /// Leave `Sending`: reset on success, back to `Composing` untouched on failure
    pub fn finish_send(&mut self, outcome: Result<()>) -> Result<()> {
        let draft = match std::mem::take(&mut self.state) {
            SessionState::Sending(draft) => draft,
            other => {
                self.state = other;
                return outcome;
            }
        };

        match outcome {
            Ok(()) => {
                info!(
                    template_id = %draft.template.id,
                    recipient = %draft.recipient,
                    "Referral sent, session reset"
                );
                self.placeholders.clear_values();
                Ok(())
            }
            Err(e) => {
                warn!(template_id = %draft.template.id, error = %e, "Referral send failed");
                self.state = SessionState::Composing(draft);
                Err(e)
            }
        }
    }

    /// Guard, dispatch once through `mailer`, then settle the session
    pub async fn send<M>(&mut self, mailer: &M) -> Result<()>
    where
        M: Mailer + ?Sized,
    {
        let email = self.begin_send()?;
        let outcome = mailer.send(&email).await;
        self.finish_send(outcome)
    }

    fn composing_mut(&mut self) -> std::result::Result<&mut Draft, ValidationError> {
        match &mut self.state {
            SessionState::Composing(draft) => Ok(draft),
            SessionState::Empty => Err(ValidationError::NoTemplateSelected),
            SessionState::Previewing { .. } => Err(ValidationError::ReadOnlyPreview),
            SessionState::Sending(_) => Err(ValidationError::SendInProgress),
        }
    }

    fn render_draft(&self, draft: &Draft) -> Rendered {
        Rendered {
            subject: self.placeholders.fill(&draft.subject),
            body: self.placeholders.fill(&draft.body),
        }
    }
}
