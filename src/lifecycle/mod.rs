//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed polling loop observes cancellation
//!               during its next delay and returns PollError::Cancelled
//! ```
//!
//! # Design Decisions
//! - Watches are only cancellable through an explicit receiver
//! - Receivers must be subscribed before the watch starts

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
