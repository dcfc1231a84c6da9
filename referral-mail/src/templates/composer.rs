//! Template authoring form
//!
//! The rich-text editor is an opaque producer of markup; the composer only
//! collects its output along with the name and subject, and decides whether
//! the result is worth saving.

use crate::error::{Result, ValidationError};
use crate::templates::store::TemplateStore;
use crate::templates::types::{NewTemplate, Template};
use tracing::info;

/// What the editor emits for a document with no content
pub const EMPTY_DOCUMENT: &str = "<p></p>";

#[derive(Debug, Clone, Default)]
pub struct TemplateComposer {
    editing: Option<String>,
    name: String,
    subject: String,
    body: String,
}

impl TemplateComposer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing template; saving replaces it under the same id
    pub fn edit(template: &Template) -> Self {
        Self {
            editing: Some(template.id.clone()),
            name: template.name.clone(),
            subject: template.subject.clone(),
            body: template.body.clone(),
        }
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.subject = subject.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body = body.into();
    }

    /// Validated, trimmed record ready for the store
    pub fn draft(&self) -> std::result::Result<NewTemplate, ValidationError> {
        let name = self.name.trim();
        let subject = self.subject.trim();

        if name.is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if subject.is_empty() {
            return Err(ValidationError::EmptyField("subject"));
        }
        if is_blank_document(&self.body) {
            return Err(ValidationError::EmptyField("body"));
        }

        Ok(NewTemplate::new(name, subject, self.body.clone()))
    }

    /// Create or replace through `store`
    ///
    /// A freshly created template clears the form; an edited one stays loaded.
    pub async fn save(&mut self, store: &dyn TemplateStore) -> Result<Template> {
        let draft = self.draft()?;

        let saved = match self.editing.as_deref() {
            Some(id) => store.replace(id, draft).await?,
            None => {
                let created = store.create(draft).await?;
                *self = Self::new();
                created
            }
        };

        info!(template_id = %saved.id, name = %saved.name, "Template saved");
        Ok(saved)
    }
}

fn is_blank_document(body: &str) -> bool {
    let body = body.trim();
    body.is_empty() || body == EMPTY_DOCUMENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_editor_document_is_blank() {
        let mut composer = TemplateComposer::new();
        composer.set_name("Referral");
        composer.set_subject("Hello");
        composer.set_body("<p></p>");

        assert_eq!(composer.draft(), Err(ValidationError::EmptyField("body")));

        composer.set_body("<p>Hi {HRname}</p>");
        assert!(composer.draft().is_ok());
    }

    #[test]
    fn test_draft_trims_name_and_subject() {
        let mut composer = TemplateComposer::new();
        composer.set_name("  Referral ");
        composer.set_subject(" Role at {company} ");
        composer.set_body("<p>Body</p>");

        let draft = composer.draft().unwrap();
        assert_eq!(draft.name, "Referral");
        assert_eq!(draft.subject, "Role at {company}");
    }

    #[test]
    fn test_blank_name_rejected_first() {
        let composer = TemplateComposer::new();
        assert_eq!(composer.draft(), Err(ValidationError::EmptyField("name")));
    }
}
