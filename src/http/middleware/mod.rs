//! Request middleware.

pub mod real_ip;

pub use real_ip::{RealIp, RealIpLayer, RealIpService, RealIpSettings};
