//! One-shot cancellation shared by every pipeline stage.
//!
//! A token is either ARMED or FIRED. Firing is permanent and visible to all
//! clones. Stages can:
//! - poll it (`is_fired`)
//! - block on it (`wait`, `wait_timeout`)
//! - select on it next to channel operations (`readiness`)

pub mod token;

pub use token::CancellationToken;
