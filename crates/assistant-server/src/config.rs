//! Server Configuration

use std::time::Duration;

/// Process-level settings read from the environment
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    /// Directory holding the compiled front-end
    pub static_dir: String,

    /// Sessions idle longer than this are dropped
    pub session_ttl: Duration,

    /// How often idle sessions are swept
    pub sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            static_dir: "static".into(),
            session_ttl: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Read `BIND_ADDR`, `STATIC_DIR` and `SESSION_TTL_SECS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: std::env::var("STATIC_DIR").unwrap_or(defaults.static_dir),
            session_ttl: std::env::var("SESSION_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map_or(defaults.session_ttl, Duration::from_secs),
            ..defaults
        }
    }
}
