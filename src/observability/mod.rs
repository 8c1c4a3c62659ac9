//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Monitor, detector and rotation service produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (analytics counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Transaction ids and addresses are structured fields, never interpolated
//! - Analytics events are counters labelled by outcome
//! - Metrics recording is a no-op until an exporter is installed

pub mod logging;
pub mod metrics;
