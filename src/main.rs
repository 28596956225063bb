use std::time::Duration;

use wsrelay::config::load_config;
use wsrelay::pubsub::redis::RedisPubSub;
use wsrelay::relay::Registry;
use wsrelay::server::start_websocket_server;
use wsrelay::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = load_config().expect("Failed to load configuration");
    logging::init(&config.log.level);

    let transport =
        RedisPubSub::connect(&config.redis.url).expect("Failed to build the Redis client");
    let registry = Registry::new(
        transport,
        Duration::from_millis(config.relay.poll_timeout_ms),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    start_websocket_server(&addr, registry)
        .await
        .expect("WebSocket server failed");
}
