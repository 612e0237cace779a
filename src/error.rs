//! Error types for the handshake and for credential configuration

use crate::address::Destination;
use crate::protocol::ReplyCode;
use std::io;
use thiserror::Error;

/// HandshakeError is every way a single client connection can end before
/// (or instead of) reaching the relay. All variants are fatal to that
/// connection only
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("unsupported SOCKS version: {0}")]
    UnsupportedVersion(u8),

    #[error("no acceptable authentication method offered")]
    NoAcceptableMethod,

    #[error("unsupported username/password sub-negotiation version: {0}")]
    UnsupportedAuthVersion(u8),

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("address type not supported: {0}")]
    AddressTypeNotSupported(u8),

    #[error("command not supported: {0}")]
    CommandNotSupported(u8),

    #[error("connect to {destination} failed: {source}")]
    Unreachable {
        destination: Destination,
        #[source]
        source: io::Error,
    },

    #[error("malformed or truncated request")]
    Truncated(#[source] io::Error),

    #[error(transparent)]
    Io(io::Error),
}

impl HandshakeError {
    /// reply_code is the REP value owed to the client for a request-phase
    /// failure. `None` means no request reply is written
    pub fn reply_code(&self) -> Option<ReplyCode> {
        match self {
            HandshakeError::AddressTypeNotSupported(_) => Some(ReplyCode::AddrTypeNotSupported),
            HandshakeError::CommandNotSupported(_) => Some(ReplyCode::CommandNotSupported),
            HandshakeError::Unreachable { .. } => Some(ReplyCode::HostUnreachable),
            _ => None,
        }
    }

    /// is_transport reports whether the connection ended on a read/write
    /// failure rather than a protocol decision
    pub fn is_transport(&self) -> bool {
        matches!(self, HandshakeError::Truncated(_) | HandshakeError::Io(_))
    }
}

impl From<io::Error> for HandshakeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::UnexpectedEof => HandshakeError::Truncated(err),
            _ => HandshakeError::Io(err),
        }
    }
}

/// CredentialError is raised while building the credential set
#[derive(Debug, Error, PartialEq)]
pub enum CredentialError {
    #[error("Duplicate <username:passwd>: {0}")]
    Duplicate(String),

    #[error("expected <username:passwd>, got: {0}")]
    Malformed(String),
}
