// Net snake AI client
//
// Usage: netsnake-ai [server_host] [server_port]
// Settings come from Planner.toml; the arguments override the server address.

use log::{error, info};
use std::env;
use std::process;

use netsnake_ai::client;
use netsnake_ai::config::Config;

#[tokio::main]
async fn main() {
    // We default to 'info' level logging. But if the `RUST_LOG` environment variable is set,
    // we keep that value instead.
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    // Load configuration once at startup
    let mut config = Config::load_or_default();

    let args: Vec<String> = env::args().collect();
    if let Some(host) = args.get(1) {
        config.client.server_host = host.clone();
    }
    if let Some(port) = args.get(2) {
        match port.parse::<u16>() {
            Ok(port) => config.client.server_port = port,
            Err(e) => {
                error!("Invalid server port '{}': {}", port, e);
                process::exit(1);
            }
        }
    }

    info!(
        "Starting net snake AI on a {}x{} arena against {}...",
        config.arena.width,
        config.arena.height,
        config.client.server_addr()
    );

    if let Err(e) = client::run(config).await {
        error!("Client stopped: {}", e);
        process::exit(1);
    }
}
