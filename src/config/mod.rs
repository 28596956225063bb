mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{LogSettings, RedisSettings, RelaySettings, ServerSettings, Settings};


/// Loads the configuration from the default file and environment variables
/// (`SERVER_HOST`, `SERVER_PORT`, `REDIS_URL`, `LOG_LEVEL`) and merges it with
/// default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Deserialize what is available, then fill the gaps.
    let partial: PartialSettings = config.try_deserialize()?;
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
        },
        redis: RedisSettings {
            url: partial
                .redis
                .as_ref()
                .and_then(|r| r.url.clone())
                .unwrap_or(default.redis.url),
        },
        relay: RelaySettings {
            poll_timeout_ms: partial
                .relay
                .as_ref()
                .and_then(|r| r.poll_timeout_ms)
                .unwrap_or(default.relay.poll_timeout_ms),
        },
        log: LogSettings {
            level: partial
                .log
                .as_ref()
                .and_then(|l| l.level.clone())
                .unwrap_or(default.log.level),
        },
    })
}
