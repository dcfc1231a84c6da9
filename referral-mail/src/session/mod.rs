//! Referral session
//!
//! Client-held working state for one compose, preview and send cycle. The
//! state machine is an explicit enum so that, for example, sending without a
//! selected template cannot be represented.

pub mod referral;
pub mod state;

pub use referral::ReferralSession;
pub use state::{Draft, Rendered, SessionPhase, SessionState};
