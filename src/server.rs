use crate::{
    auth::{self, Credentials},
    commands,
    error::HandshakeError,
    relay,
};
use anyhow::{Result, anyhow, bail};
use std::{
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
};
use tracing::{debug, info, warn};

/// Socks5Server represents a SOCKS5 server and houses related
/// configuration data
pub struct Socks5Server {
    pub listen_addr: String,
    credentials: Arc<Credentials>,
    connections: ConnectionCounter,
    listener: Option<TcpListener>,
}

/// Socks5Server implementation block
impl Socks5Server {
    /// new is a constructor for the Socks5Server type
    pub fn new(listen_addr: impl Into<String>) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            credentials: Arc::new(Credentials::new()),
            connections: ConnectionCounter::new(),
            listener: None,
        }
    }

    /// with_credentials sets the accepted credentials. A non-empty set
    /// makes username/password authentication mandatory
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// connections returns a handle on the live connection count
    pub fn connections(&self) -> ConnectionCounter {
        self.connections.clone()
    }

    /// bind to the listen address
    pub async fn bind(&mut self) -> Result<SocketAddr> {
        if self.listener.is_some() {
            bail!("already bound to {}", self.listen_addr);
        }

        // Instantiate tokio listener
        let listener = TcpListener::bind(&self.listen_addr).await?;
        let addr = listener.local_addr()?;

        info!("SOCKS5 proxy listening on {}", addr);

        self.listener = Some(listener);
        Ok(addr)
    }

    /// run accepts connections forever, one task per client
    pub async fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind().await?;
        }
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow!("listener missing after bind"))?;

        loop {
            let (inbound, peer_addr) = listener.accept().await?;

            // Counted before the task starts, released when it ends
            let guard = self.connections.enter(peer_addr);
            let credentials = Arc::clone(&self.credentials);

            tokio::spawn(async move {
                let _guard = guard;

                if let Err(e) = handle_connection(inbound, &credentials).await {
                    if e.is_transport() {
                        debug!("connection from {} closed: {}", peer_addr, e);
                    } else {
                        warn!("connection from {} rejected: {}", peer_addr, e);
                    }
                }
            });
        }
    }
}

/// handle_connection handles the full client/server SOCKS5 protocol flow
/// for one accepted stream. The stream is dropped (closed) on every return
pub async fn handle_connection<S>(
    mut stream: S,
    credentials: &Credentials,
) -> Result<(), HandshakeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // Negotiate authentication with client
    auth::negotiate_auth(&mut stream, credentials).await?;

    // Handle connection request from client
    let outbound = commands::handle_socks_request(&mut stream).await?;

    // Proxy
    relay::relay(stream, outbound).await;

    Ok(())
}

/// ConnectionCounter tracks the number of live client connections.
/// Clones share the same count
#[derive(Debug, Clone, Default)]
pub struct ConnectionCounter(Arc<AtomicUsize>);

impl ConnectionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// active is the current number of live connections
    pub fn active(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    /// enter counts a new connection until the returned guard is dropped
    pub fn enter(&self, peer_addr: SocketAddr) -> ConnectionGuard {
        let active = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        info!("accepted connection from {}, active connections: {}", peer_addr, active);
        ConnectionGuard {
            counter: self.clone(),
            peer_addr,
        }
    }
}

/// ConnectionGuard releases one slot of its ConnectionCounter on drop,
/// including when the connection task unwinds
#[derive(Debug)]
pub struct ConnectionGuard {
    counter: ConnectionCounter,
    peer_addr: SocketAddr,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let active = self.counter.0.fetch_sub(1, Ordering::SeqCst) - 1;
        info!("disconnect from {}, active connections: {}", self.peer_addr, active);
    }
}
