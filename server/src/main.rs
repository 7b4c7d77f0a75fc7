use clap::Parser;
use log::{error, info};
use server::config::GameConfig;
use server::game::Game;
use server::network::Server;
use server::transport::{Transport, UdpBus};
use shared::topics;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Authoritative Power-Up Pong server", long_about = None)]
struct Args {
    /// Pub/sub relay address
    #[arg(short, long, default_value = "127.0.0.1:1883")]
    broker: String,

    /// Local address to bind the bus socket to
    #[arg(long, default_value = "0.0.0.0:0")]
    bind: String,

    /// Tick period in milliseconds
    #[arg(short, long, default_value = "30")]
    tick_ms: u64,

    /// Pause after a point in milliseconds
    #[arg(long, default_value = "1000")]
    pause_ms: u64,

    /// Seconds between power-up spawns
    #[arg(long, default_value = "2")]
    spawn_secs: u64,

    /// Seconds an activated power-up stays in effect
    #[arg(long, default_value = "5")]
    effect_secs: u64,

    /// RNG seed (random when omitted)
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = GameConfig {
        tick_period: Duration::from_millis(args.tick_ms.max(1)),
        score_pause: Duration::from_millis(args.pause_ms),
        powerup_spawn_interval: Duration::from_secs(args.spawn_secs),
        powerup_effect_duration: Duration::from_secs(args.effect_secs),
        ..GameConfig::default()
    };

    let subscriptions = vec![topics::ctrl(1), topics::ctrl(2), topics::BUTTON.to_string()];

    let (bus, inbound) = match UdpBus::connect(&args.bind, &args.broker, &subscriptions).await {
        Ok(connection) => connection,
        Err(e) => {
            error!("Cannot reach broker {}: {}", args.broker, e);
            eprintln!("Cannot reach broker {}: {}", args.broker, e);
            std::process::exit(1);
        }
    };
    let transport: Arc<dyn Transport> = Arc::new(bus);

    let seed = args.seed.unwrap_or_else(rand::random);
    let game = Game::new(config, seed, Instant::now());
    let mut server = Server::new(game, transport, inbound);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e.into());
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
