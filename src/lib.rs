//! Real client IP resolution for requests arriving through proxy chains.
//!
//! A request's peer address and `X-Forwarded-For` chain are checked against
//! a fixed set of trusted networks. The rightmost untrusted hop becomes the
//! real IP, and the chain is cut there. The result is written to
//! `X-Real-Ip` / `X-Forwarded-For` before the request moves on.
//!
//! ```
//! use real_ip_proxy::security::{resolve, TrustSet};
//!
//! let trust = TrustSet::build(["10.0.0.0/24"]).unwrap();
//! let res = resolve(&trust, "10.0.0.1:9000", Some("1.1.1.1, 10.0.0.1")).unwrap();
//! assert_eq!(res.real_ip.to_string(), "1.1.1.1");
//! assert_eq!(res.forwarded_for().as_deref(), Some("1.1.1.1, 10.0.0.1"));
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::{ResolveError, TrustSetError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
