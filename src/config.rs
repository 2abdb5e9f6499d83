use std::env;
use std::str::FromStr;

use crate::conversation::CommitMode;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Idle minutes before a conversation slot is evicted.
    pub session_ttl_minutes: i64,
    pub session_sweep_seconds: u64,
    pub commit_mode: CommitMode,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let commit_mode = match env::var("COMMIT_MODE") {
            Ok(value) => value.parse()?,
            Err(_) => CommitMode::default(),
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:liftchat.db?mode=rwc".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_or("PORT", 3000),
            session_ttl_minutes: positive_or(env::var("SESSION_TTL_MINUTES").ok(), 30),
            session_sweep_seconds: parse_or("SESSION_SWEEP_SECONDS", 60),
            commit_mode,
        })
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

/// Parse a strictly positive count, falling back to `default` otherwise.
fn positive_or(value: Option<String>, default: i64) -> i64 {
    value
        .and_then(|value| value.trim().parse().ok())
        .filter(|minutes: &i64| *minutes > 0)
        .unwrap_or(default)
}
