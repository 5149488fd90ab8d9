//! Client identity subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → trust.rs (is the peer / each hop inside a trusted network?)
//!     → real_ip.rs (walk the forwarded-for chain, find the real client)
//!     → headers.rs (write X-Real-Ip, replace X-Forwarded-For)
//!     → Pass to upstream
//! ```
//!
//! # Design Decisions
//! - Fail closed: an identity that cannot be established is a 500
//! - No trust in client input unless the peer is a trusted proxy

pub mod headers;
pub mod real_ip;
pub mod trust;

pub use real_ip::{resolve, Chain, Discard, Resolution};
pub use trust::TrustSet;
