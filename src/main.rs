use anyhow::Result;
use clap::Parser;
use socksd::{Credentials, Socks5Server};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "A small SOCKS5 proxy", long_about = None)]
struct Args {
    /// Listener address: <host:port>
    #[arg(short, long)]
    listen: String,

    /// Add an accepted credential: <username:passwd> (repeatable)
    #[arg(short = 'a', long = "auth", value_name = "USERNAME:PASSWD")]
    auth: Vec<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();

    // Initialize tracing subscriber
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(level).init();

    // Build the credential set before accepting anything
    let credentials = Credentials::from_tokens(args.auth)?;
    if !credentials.is_empty() {
        info!(
            "Authentication enabled: {} credential(s)",
            credentials.len()
        );
    }

    // Instantiate server
    let mut server = Socks5Server::new(args.listen).with_credentials(credentials);

    // Run it
    info!("Starting SOCKS5 proxy: {}", server.listen_addr);
    server.run().await
}
