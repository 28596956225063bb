use serde::Deserialize;

/// Top-level configuration for the relay.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub redis: RedisSettings,
    pub relay: RelaySettings,
    pub log: LogSettings,
}

/// Address the WebSocket listener binds to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Upstream broker connection.
#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub url: String,
}

/// Engine tuning.
#[derive(Debug, Deserialize, Clone)]
pub struct RelaySettings {
    /// Bounded wait for each upstream poll; this also bounds how long a pump
    /// takes to notice its channel was torn down.
    pub poll_timeout_ms: u64,
}

/// Logging.
#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration loaded from files or environment.
///
/// Allows partial specification; missing values fall back to defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub redis: Option<PartialRedisSettings>,
    pub relay: Option<PartialRelaySettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRedisSettings {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PartialRelaySettings {
    pub poll_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            redis: RedisSettings {
                url: "redis://127.0.0.1:6379".to_string(),
            },
            relay: RelaySettings {
                poll_timeout_ms: 1000,
            },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
