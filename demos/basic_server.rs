//! Basic SOCKS5 server example, no authentication

use socksd::Socks5Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let mut server = Socks5Server::new("127.0.0.1:1080");
    server.run().await
}
