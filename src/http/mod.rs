//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (peer address captured as ConnectInfo)
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → middleware/real_ip.rs (resolve client, rewrite headers)
//!     → server.rs forward handler (send to upstream)
//!     → Send response to client
//! ```

pub mod middleware;
pub mod server;

pub use server::HttpServer;
