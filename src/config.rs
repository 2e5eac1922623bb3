use std::net::SocketAddr;
use std::str::FromStr;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Application-level constants
pub const APP_NAME: &str = "ER Roster";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";
pub const DEFAULT_EVENT_CAPACITY: usize = 64;
pub const DEFAULT_SSE_KEEPALIVE_SECS: u64 = 15;

/// Uncompressed P-256 public key length for VAPID.
pub const VAPID_KEY_LEN: usize = 65;

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,er_roster=debug,er_roster_lib=debug"
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    /// Load sample data at startup.
    pub seed: bool,
    pub vapid_public_key: Option<String>,
    pub event_capacity: usize,
    pub sse_keepalive_secs: u64,
    /// Allowed CORS origin. Any origin when `None`.
    pub cors_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            seed: true,
            vapid_public_key: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            sse_keepalive_secs: DEFAULT_SSE_KEEPALIVE_SECS,
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Invalid values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(bind) = parse_var(&lookup, "ER_ROSTER_BIND") {
            config.bind = bind;
        }
        if let Some(raw) = lookup("ER_ROSTER_SEED") {
            match parse_flag(&raw) {
                Some(seed) => config.seed = seed,
                None => tracing::warn!(value = %raw, "ER_ROSTER_SEED is not a boolean, keeping default"),
            }
        }
        if let Some(capacity) = parse_var::<usize>(&lookup, "ER_ROSTER_EVENT_CAPACITY") {
            if capacity > 0 {
                config.event_capacity = capacity;
            } else {
                tracing::warn!("ER_ROSTER_EVENT_CAPACITY must be positive, keeping default");
            }
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "ER_ROSTER_SSE_KEEPALIVE_SECS") {
            if secs > 0 {
                config.sse_keepalive_secs = secs;
            } else {
                tracing::warn!("ER_ROSTER_SSE_KEEPALIVE_SECS must be positive, keeping default");
            }
        }
        if let Some(key) = lookup("ER_ROSTER_VAPID_PUBLIC_KEY").filter(|k| !k.trim().is_empty()) {
            let key = key.trim().to_string();
            if is_valid_vapid_key(&key) {
                config.vapid_public_key = Some(key);
            } else {
                tracing::warn!("ER_ROSTER_VAPID_PUBLIC_KEY is not a 65-byte URL-safe base64 key, ignoring");
            }
        }
        config.cors_origin = lookup("ER_ROSTER_CORS_ORIGIN")
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Invalid configuration value, keeping default");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// VAPID public keys are URL-safe base64 of an uncompressed P-256 point.
pub fn is_valid_vapid_key(key: &str) -> bool {
    URL_SAFE_NO_PAD
        .decode(key.trim_end_matches('='))
        .map(|bytes| bytes.len() == VAPID_KEY_LEN && bytes[0] == 0x04)
        .unwrap_or(false)
}
