use std::time::Duration;

use clap::Parser;
use huddle::signaling::{DEFAULT_RELAY_PORT, RelayServer};

#[derive(Parser, Debug)]
#[command(name = "huddle")]
#[command(about = "Room-based signaling relay for WebRTC peers", long_about = None)]
struct Args {
    /// Host address to bind the relay to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the relay to
    #[arg(short = 'p', long, default_value_t = DEFAULT_RELAY_PORT)]
    port: u16,

    /// Liveness probe interval in seconds
    #[arg(long, default_value_t = 30)]
    ping_interval: u64,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.host, args.port);

    println!("   Huddle Signaling Relay");
    println!("   Binding to {}", bind_addr);
    println!("   Press Ctrl+C to stop\n");

    let server = RelayServer::bind(&bind_addr)
        .await?
        .with_ping_interval(Duration::from_secs(args.ping_interval));
    server.run().await
}
