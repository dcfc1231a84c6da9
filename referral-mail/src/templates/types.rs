//! Template types and data structures

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored referral template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Subject line, may contain placeholder tokens
    pub subject: String,
    /// HTML body produced by the composer
    pub body: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last replacement timestamp
    pub updated_at: DateTime<Utc>,
}

/// Complete set of fields for creating or replacing a template
///
/// Missing JSON fields decode as empty strings so that validation, not the
/// decoder, reports them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl NewTemplate {
    pub fn new(
        name: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Every field must be non-blank
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        if self.subject.trim().is_empty() {
            return Err(ValidationError::EmptyField("subject"));
        }
        if self.body.trim().is_empty() {
            return Err(ValidationError::EmptyField("body"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_reports_first_empty_field() {
        let draft = NewTemplate::new("", "S", "B");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyField("name")));

        let draft = NewTemplate::new("N", "  ", "B");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyField("subject")));

        let draft = NewTemplate::new("N", "S", "");
        assert_eq!(draft.validate(), Err(ValidationError::EmptyField("body")));

        assert!(NewTemplate::new("N", "S", "B").validate().is_ok());
    }

    #[test]
    fn test_missing_json_fields_decode_empty() {
        let draft: NewTemplate = serde_json::from_str(r#"{"subject":"S"}"#).unwrap();
        assert_eq!(draft.name, "");
        assert_eq!(draft.subject, "S");
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_template_serializes_camel_case() {
        let now = Utc::now();
        let template = Template {
            id: "t1".to_string(),
            name: "Referral".to_string(),
            subject: "Hi".to_string(),
            body: "<p>Hi</p>".to_string(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&template).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("created_at").is_none());
    }
}
