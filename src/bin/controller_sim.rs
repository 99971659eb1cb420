//! Bus gateway with simulated controller boards.
//!
//! Run this, then start the console with `CONSOLE_GATEWAY=127.0.0.1:7878`.
//!
//! - `SIM_HOST` / `SIM_PORT`: listen address (default 127.0.0.1:7878)
//! - `SIM_GAME_POLLS`: fixed game length in status polls; unset picks a random
//!   length per game
//! - `SIM_SEED`: seed for randomized boards

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Result;
use tracing::info;

use tetris_console::adapter::{
    run_gateway, ControllerScript, GatewayConfig, SimulatedBus, SimulatedController,
};
use tetris_console::types::controller_addresses;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = GatewayConfig::from_env();
    let bus = match env_u32("SIM_GAME_POLLS") {
        Some(polls) => {
            let mut bus = SimulatedBus::new();
            for addr in controller_addresses() {
                let script = ControllerScript::default()
                    .with_ready_after(1)
                    .with_game_polls(polls);
                bus.attach(addr, SimulatedController::new(script));
            }
            info!(polls, "fixed-length games");
            bus
        }
        None => {
            let seed = env_u32("SIM_SEED").unwrap_or_else(|| {
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.subsec_nanos())
                    .unwrap_or(1)
            });
            info!(seed, "randomized games");
            SimulatedBus::randomized(seed, 50, 600)
        }
    };

    run_gateway(config, bus, None).await
}

fn env_u32(key: &str) -> Option<u32> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}
