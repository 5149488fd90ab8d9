//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! real_ip middleware / upstream handler produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (resolution outcome counters)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
