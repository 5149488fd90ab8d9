//! Network layer helpers.
//!
//! The transport hands over the peer as `host:port`; `peer.rs` turns it
//! into an address the trust set can classify.

pub mod peer;
