//! Per-connection configuration: fetch size, connection/query timeouts, and
//! the user-agent string sent in HELLO. Built via a builder, then shared as
//! an immutable, cheaply-`Clone`able handle — the same "build once, share
//! read-only" shape used for process-wide config elsewhere in this crate,
//! scoped here to a single connection instead.

use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub fetch_size: u32,
    pub max_rows: Option<u64>,
    pub connect_timeout: Duration,
    pub query_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            fetch_size: 1000,
            max_rows: None,
            connect_timeout: Duration::from_secs(30),
            query_timeout: None,
            user_agent: format!("boltshim/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Default)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fetch_size(mut self, fetch_size: u32) -> Self {
        self.config.fetch_size = fetch_size;
        self
    }

    pub fn max_rows(mut self, max_rows: u64) -> Self {
        self.config.max_rows = Some(max_rows);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.config.query_timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn build(self) -> Arc<ConnectionConfig> {
        Arc::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ConnectionConfig::default();
        assert_eq!(config.fetch_size, 1000);
        assert!(config.max_rows.is_none());
    }

    #[test]
    fn builder_overrides_defaults() {
        let config = ConnectionConfigBuilder::new().fetch_size(50).max_rows(200).build();
        assert_eq!(config.fetch_size, 50);
        assert_eq!(config.max_rows, Some(200));
    }
}
