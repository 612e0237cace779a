use crate::address::{Destination, read_destination};
use crate::error::HandshakeError;
use crate::protocol::{AddressType, Command, RSV, ReplyCode, Version};
use std::io;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};
use tracing::{debug, info, warn};

/// Request is a decoded client request: what to do and where.
/// Built once per connection and consumed by the dial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub command: Command,
    pub destination: Destination,
}

/// Request implementation block
impl Request {
    /// to_bytes encodes the request the way a client sends it
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        let mut buf = vec![Version::SOCKS5 as u8, self.command.as_byte(), RSV];
        self.destination.encode(&mut buf)?;
        Ok(buf)
    }
}

/// handle_socks_request reads the client request, carries out the command
/// and writes the reply. On success the outbound stream is returned ready
/// for relaying; on failure the matching reply (if one is owed) has already
/// been sent
pub async fn handle_socks_request<S>(stream: &mut S) -> Result<TcpStream, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match process_request(stream).await {
        Ok(outbound) => {
            send_reply(stream, ReplyCode::Succeeded).await?;
            Ok(outbound)
        }
        Err(e) => {
            if let Some(code) = e.reply_code() {
                if let Err(write_err) = send_reply(stream, code).await {
                    debug!("failed to send {:?} reply: {}", code, write_err);
                }
            }
            Err(e)
        }
    }
}

async fn process_request<S>(stream: &mut S) -> Result<TcpStream, HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = read_request(stream).await?;
    dispatch(request).await
}

/// read_request decodes a SOCKS5 request from the stream
pub async fn read_request<R>(stream: &mut R) -> Result<Request, HandshakeError>
where
    R: AsyncRead + Unpin,
{
    // SOCKS5 request format
    // +----+-----+-------+------+----------+----------+
    // |VER | CMD |  RSV  | ATYP | DST.ADDR | DST.PORT |
    // +----+-----+-------+------+----------+----------+
    // | 1  |  1  | X'00' |  1   | Variable |    2     |
    // +----+-----+-------+------+----------+----------+

    // VER was settled during negotiation and RSV is ignored
    let mut header = [0u8; 4];
    stream.read_exact(&mut header).await?;

    let command = Command::from(header[1]);
    let atyp = header[3];

    let destination = read_destination(stream, atyp)
        .await?
        .ok_or(HandshakeError::AddressTypeNotSupported(atyp))?;

    Ok(Request {
        command,
        destination,
    })
}

/// dispatch carries out the request command. Only CONNECT is served
async fn dispatch(request: Request) -> Result<TcpStream, HandshakeError> {
    match request.command {
        Command::Connect => handle_connect_cmd(request.destination).await,
        other => {
            warn!("rejecting unsupported command {:?}", other);
            Err(HandshakeError::CommandNotSupported(other.as_byte()))
        }
    }
}

// ================
// CONNECT COMMAND
// ================

/// handle_connect_cmd dials the destination. Every dial failure (resolution,
/// refusal, unreachable) is reported to the client the same way
async fn handle_connect_cmd(destination: Destination) -> Result<TcpStream, HandshakeError> {
    match TcpStream::connect(destination.to_string()).await {
        Ok(outbound) => {
            info!("connected to {}", destination);
            Ok(outbound)
        }
        Err(source) => {
            warn!("connect to {} failed: {}", destination, source);
            Err(HandshakeError::Unreachable {
                destination,
                source,
            })
        }
    }
}

// =========
// HELPERS
// =========

/// encode_reply builds a reply message. Success carries a fixed all-zero
/// IPv4 bound address; rejections are just VER and REP
pub fn encode_reply(reply_code: ReplyCode) -> Vec<u8> {
    // SOCKS5 reply format
    // +----+-----+-------+------+----------+----------+
    // |VER | REP |  RSV  | ATYP | BND.ADDR | BND.PORT |
    // +----+-----+-------+------+----------+----------+
    // | 1  |  1  | X'00' |  1   | Variable |    2     |
    // +----+-----+-------+------+----------+----------+

    let mut reply = vec![Version::SOCKS5 as u8, reply_code as u8];
    if reply_code == ReplyCode::Succeeded {
        reply.extend_from_slice(&[RSV, AddressType::IPv4 as u8, 0, 0, 0, 0, 0, 0]);
    }
    reply
}

/// send_reply writes a whole reply in one call
async fn send_reply<W>(stream: &mut W, reply_code: ReplyCode) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    stream.write_all(&encode_reply(reply_code)).await
}
