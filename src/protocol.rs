// RSV: Fields marked RESERVED (RSV) must be set to X'00'.
pub const RSV: u8 = 0x00;

/// USERPASS_VERSION is the username/password sub-negotiation version (RFC 1929)
pub const USERPASS_VERSION: u8 = 0x01;

/// Version represents available SOCKS proxy versions.
/// Only SOCKS5 is spoken by this server
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Version {
    SOCKS5 = 0x05,
}

/// AuthMethod represents the SOCKS5 authentication methods
/// this server can select
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthMethod {
    NoAuth = 0x00,
    // Gssapi = 0x01, not supported
    UserPass = 0x02,
    // 0x03 - 0x7f: IANA reserved
    // 0x80 - 0xFE: private methods
    NoAcceptable = 0xFF,
}

/// AuthStatus is the STATUS field of the username/password reply
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthStatus {
    Success = 0x00,
    Failure = 0x01,
}

/// AddressType represents the SOCKS5 address types:
/// IPv4, Domain Name, IPv6
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddressType {
    IPv4 = 0x01,
    DomainName = 0x03,
    IPv6 = 0x04,
}

/// AddressType implementation block
impl AddressType {
    /// from_byte converts a byte to its related network address type
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(AddressType::IPv4),
            0x03 => Some(AddressType::DomainName),
            0x04 => Some(AddressType::IPv6),
            _ => None,
        }
    }
}

/// Command represents the CMD field of a client request.
/// Values outside RFC 1928 are kept so they can be rejected with
/// the right reply instead of being dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Connect,
    Bind,
    UdpAssociate,
    Unknown(u8),
}

/// Command implementation block
impl Command {
    /// as_byte returns the wire value of the command
    pub fn as_byte(self) -> u8 {
        match self {
            Command::Connect => 0x01,
            Command::Bind => 0x02,
            Command::UdpAssociate => 0x03,
            Command::Unknown(byte) => byte,
        }
    }
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        match byte {
            0x01 => Command::Connect,
            0x02 => Command::Bind,
            0x03 => Command::UdpAssociate,
            other => Command::Unknown(other),
        }
    }
}

/// ReplyCode is the REP field of the server's request reply
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReplyCode {
    Succeeded = 0x00,
    ServerFailure = 0x01,
    ConnectionNotAllowed = 0x02,
    NetworkUnreachable = 0x03,
    HostUnreachable = 0x04,
    ConnectionRefused = 0x05,
    TtlExpired = 0x06,
    CommandNotSupported = 0x07,
    AddrTypeNotSupported = 0x08,
    // 0x09 - 0xFF: unassigned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_code_values() {
        let cases = [
            (ReplyCode::Succeeded, 0),
            (ReplyCode::ServerFailure, 1),
            (ReplyCode::ConnectionNotAllowed, 2),
            (ReplyCode::NetworkUnreachable, 3),
            (ReplyCode::HostUnreachable, 4),
            (ReplyCode::ConnectionRefused, 5),
            (ReplyCode::TtlExpired, 6),
            (ReplyCode::CommandNotSupported, 7),
            (ReplyCode::AddrTypeNotSupported, 8),
        ];
        for (code, byte) in cases {
            assert_eq!(code as u8, byte, "{code:?}");
        }
    }

    #[test]
    fn test_command_from_byte() {
        assert_eq!(Command::from(1), Command::Connect);
        assert_eq!(Command::from(2), Command::Bind);
        assert_eq!(Command::from(3), Command::UdpAssociate);
        assert_eq!(Command::from(9), Command::Unknown(9));
        assert_eq!(Command::Unknown(9).as_byte(), 9);
        assert_eq!(Command::Bind.as_byte(), 2);
    }

    #[test]
    fn test_address_type_from_byte() {
        assert_eq!(AddressType::from_byte(1), Some(AddressType::IPv4));
        assert_eq!(AddressType::from_byte(3), Some(AddressType::DomainName));
        assert_eq!(AddressType::from_byte(4), Some(AddressType::IPv6));
        assert_eq!(AddressType::from_byte(2), None);
    }

    #[test]
    fn test_auth_method_values() {
        assert_eq!(AuthMethod::NoAuth as u8, 0);
        assert_eq!(AuthMethod::UserPass as u8, 2);
        assert_eq!(AuthMethod::NoAcceptable as u8, 255);
        assert_eq!(AuthStatus::Success as u8, 0);
        assert_eq!(AuthStatus::Failure as u8, 1);
    }
}
