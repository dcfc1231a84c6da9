//! Referral templates
//!
//! Template persistence, the authoring composer, and `{key}` placeholder
//! substitution.

pub mod composer;
pub mod placeholder;
pub mod store;
pub mod types;

pub use composer::TemplateComposer;
pub use placeholder::{fill, Placeholder, PlaceholderSet};
pub use store::{SqliteTemplateStore, TemplateStore};
pub use types::{NewTemplate, Template};
