use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// relay copies bytes client -> destination and destination -> client
/// concurrently, and returns only after both directions have finished.
///
/// When one source hits EOF or an error, its peer's write half is shut down
/// so the other side sees end-of-stream, while the opposite direction keeps
/// draining. Copy errors end a direction; they are not failures of the relay.
///
/// Returns `(bytes from client, bytes from destination)`.
pub async fn relay<A, B>(client: A, destination: B) -> (u64, u64)
where
    A: AsyncRead + AsyncWrite,
    B: AsyncRead + AsyncWrite,
{
    let (mut client_read, mut client_write) = io::split(client);
    let (mut dest_read, mut dest_write) = io::split(destination);

    let (from_client, from_server) = tokio::join!(
        pipe(&mut client_read, &mut dest_write, "client -> destination"),
        pipe(&mut dest_read, &mut client_write, "destination -> client"),
    );

    info!(
        "connection closed: {} bytes from client, {} bytes from server",
        from_client, from_server
    );

    (from_client, from_server)
}

/// BUFFER_SIZE is the per-direction copy buffer
const BUFFER_SIZE: usize = 8192;

/// pipe copies one direction until EOF or error, then half-closes the writer.
/// The count covers every byte written before the direction ended
async fn pipe<R, W>(reader: &mut R, writer: &mut W, direction: &str) -> u64
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut copied = 0u64;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                debug!("{} read ended with error: {}", direction, e);
                break;
            }
        };

        if let Err(e) = writer.write_all(&buf[..n]).await {
            debug!("{} write ended with error: {}", direction, e);
            break;
        }
        copied += n as u64;
    }

    if let Err(e) = writer.shutdown().await {
        debug!("{} shutdown: {}", direction, e);
    }

    copied
}
