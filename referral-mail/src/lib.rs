//! referral-mail: referral email templates and dispatch
//!
//! Stores reusable referral templates, fills their `{key}` placeholders and
//! sends the result through an SMTP relay, optionally with one attachment.
//!
//! # Example
//!
//! ```no_run
//! use referral_mail::mailer::SmtpMailer;
//! use referral_mail::session::ReferralSession;
//! use referral_mail::templates::{NewTemplate, SqliteTemplateStore, TemplateStore};
//! use referral_mail::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = SqliteTemplateStore::connect(&config.storage.database_url).await?;
//!     let template = store
//!         .create(NewTemplate::new(
//!             "Referral ask",
//!             "Referral for {role}",
//!             "<p>Hi {HRname}, I'd love a referral for {role} at {company}.</p>",
//!         ))
//!         .await?;
//!
//!     let mut session = ReferralSession::default();
//!     session.select_template(template)?;
//!     session.set_placeholder("HRname", "Dana")?;
//!     session.set_placeholder("role", "Engineer")?;
//!     session.set_placeholder("company", "Acme")?;
//!     session.set_recipient("dana@acme.test")?;
//!
//!     let mailer = SmtpMailer::new(&config.smtp);
//!     session.send(&mailer).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`templates`]: template storage, composer and placeholder engine
//! - [`session`]: the compose / preview / send state machine
//! - [`mailer`]: outbound dispatch over SMTP
//! - [`api`]: HTTP server exposing templates and the send endpoint
//! - [`client`]: HTTP client used by the `referral` CLI

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod mailer;
pub mod session;
pub mod templates;

// Re-export commonly used types
pub use config::Config;
pub use error::{ReferralError, Result, ValidationError};
