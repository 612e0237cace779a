//! A small SOCKS5 proxy library
//!
//! ## SOCKS5 Implementation
//!
//! - Features:
//!     - CONNECT
//!     - No Authentication
//!     - Username/Password Authentication against a fixed set of `username:password` tokens
//!     - Async using tokio, one task per client connection
//!     - Live connection accounting
//! - Not supported (answered with the matching reply code):
//!     - BIND, UDP ASSOCIATE
//!     - IPv6 destination addresses
//! - [SOCKS5 (RFC 1928)](https://datatracker.ietf.org/doc/html/rfc1928)
//! - [Username/Password Authentication (RFC 1929)](https://datatracker.ietf.org/doc/html/rfc1929)
//!
//! # Example
//! ```no_run
//! use socksd::{Credentials, Socks5Server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let credentials = Credentials::from_tokens(["alice:secret"])?;
//!     let mut server = Socks5Server::new("127.0.0.1:1080").with_credentials(credentials);
//!     server.run().await
//! }
//! ```

pub mod address;
pub mod auth;
pub mod commands;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod server;

// Re-export main types at crate root for convenience
pub use address::Destination;
pub use auth::Credentials;
pub use commands::Request;
pub use error::{CredentialError, HandshakeError};
pub use protocol::{AuthMethod, AuthStatus, Command, ReplyCode, Version};
pub use server::{ConnectionCounter, Socks5Server, handle_connection};
