//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Ledger / indexer call:
//!     → polling.rs (repeat producer with a fixed delay while a condition holds)
//!     → poll_bounded adds attempt cap, deadline and cancellation
//! ```
//!
//! # Design Decisions
//! - Fixed delay, no jitter: the ledger finalizes on a steady cadence
//! - Producer errors are never retried by the primitive itself
//! - Loops own their state; nothing is shared between invocations

pub mod polling;

pub use polling::{poll, poll_bounded, PollError, PollLimits};
