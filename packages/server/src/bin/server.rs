//! Kartwatch roster tracker server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin kartwatch-server -- --help
//! ```

use clap::Parser;
use kartwatch_server::Config;
use kartwatch_shared::logger::setup_logger;

#[tokio::main]
async fn main() {
    let config = Config::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &config.log_level);

    // Run the server
    if let Err(e) = kartwatch_server::run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
