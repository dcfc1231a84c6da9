//! Outbound dispatch
//!
//! A [`Mailer`] takes a fully resolved message and makes exactly one attempt
//! to hand it to the relay. Failures are surfaced as-is; nothing is retried.

pub mod smtp;

pub use smtp::SmtpMailer;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub const DEFAULT_ATTACHMENT_NAME: &str = "attachment";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Single file sent along with a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name, preserved in the outbound message
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        Self {
            filename: if filename.is_empty() {
                DEFAULT_ATTACHMENT_NAME.to_string()
            } else {
                filename
            },
            content_type,
            data,
        }
    }

    /// Read a file from disk, keeping its file name
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self::new(filename, None, data))
    }

    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// Fully resolved message ready for dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub recipient: String,
    pub subject: String,
    pub body_html: String,
    pub attachment: Option<Attachment>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Single attempt; transport problems come back as `Dispatch`
    async fn send(&self, email: &OutboundEmail) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_unnamed_attachment_gets_default_name() {
        let attachment = Attachment::new("", None, vec![1, 2, 3]);
        assert_eq!(attachment.filename, "attachment");
        assert_eq!(attachment.content_type_or_default(), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_attachment_from_path_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let attachment = Attachment::from_path(&path).await.unwrap();

        assert_eq!(attachment.filename, "resume.pdf");
        assert_eq!(attachment.data, b"%PDF-1.4");
    }
}
