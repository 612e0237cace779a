use crate::protocol::AddressType;
use std::{fmt, io, net::Ipv4Addr};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Destination is the target host and port named by a client request.
/// `address` is either a dotted-decimal IPv4 literal or a domain name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: String,
    pub port: u16,
}

/// Destination implementation block
impl Destination {
    /// new is a constructor for the Destination type
    pub fn new(address: impl Into<String>, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }

    /// encode appends ATYP, DST.ADDR and DST.PORT in request wire form.
    /// IPv4 literals are written as 4 raw bytes, anything else as a domain
    pub fn encode(&self, buf: &mut Vec<u8>) -> io::Result<()> {
        match self.address.parse::<Ipv4Addr>() {
            Ok(ip) => {
                buf.push(AddressType::IPv4 as u8);
                buf.extend_from_slice(&ip.octets());
            }
            Err(_) => {
                let name = self.address.as_bytes();
                let len = u8::try_from(name.len()).map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("domain name too long: {} bytes", name.len()),
                    )
                })?;
                buf.push(AddressType::DomainName as u8);
                buf.push(len);
                buf.extend_from_slice(name);
            }
        }

        // Port in BE -> 2 bytes
        buf.extend_from_slice(&self.port.to_be_bytes());
        Ok(())
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// read_destination decodes DST.ADDR and DST.PORT for the given address type.
///
/// Returns `Ok(None)` when the address type is not decoded by this server
/// (IPv6 or unknown); nothing more is consumed from the stream in that case.
/// A short read surfaces as an `UnexpectedEof` error.
pub async fn read_destination<R>(stream: &mut R, atyp: u8) -> io::Result<Option<Destination>>
where
    R: AsyncRead + Unpin,
{
    let address = match AddressType::from_byte(atyp) {
        Some(AddressType::IPv4) => {
            let mut addr = [0u8; 4];
            stream.read_exact(&mut addr).await?;
            Ipv4Addr::from(addr).to_string()
        }
        Some(AddressType::DomainName) => {
            // First octet in DomainName contains the number of
            // octets to follow
            let len = stream.read_u8().await?;

            let mut domain = vec![0u8; len as usize];
            stream.read_exact(&mut domain).await?;
            String::from_utf8_lossy(&domain).into_owned()
        }
        Some(AddressType::IPv6) | None => return Ok(None),
    };

    // Read port -> big endian
    let port = stream.read_u16().await?;

    Ok(Some(Destination { address, port }))
}
