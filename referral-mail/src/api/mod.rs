//! REST API for referral-mail
//!
//! Template CRUD plus the transactional send endpoint.

pub mod email;
pub mod handlers;
pub mod server;
pub mod templates;

pub use handlers::AppState;
pub use server::ApiServer;
