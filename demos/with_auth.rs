//! SOCKS5 server with username/password authentication example

use socksd::{Credentials, Socks5Server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let credentials = Credentials::from_tokens(["<user>:<pass>", "<other>:<pass>"])?;

    let mut server = Socks5Server::new("127.0.0.1:1080").with_credentials(credentials);
    server.run().await
}
