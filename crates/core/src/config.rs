/// Environment variable naming the broker endpoint.
pub const BROKER_URL_ENV: &str = "BROKER_URL";

/// Broker endpoint used when `BROKER_URL` is unset.
pub const DEFAULT_BROKER_URL: &str = "ws://localhost:8000";

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "notify";

/// Database used when none is configured.
pub const DEFAULT_DATABASE: &str = "queue";

/// Connection settings for the job store, shared by gateway and workers.
#[derive(Clone, Debug)]
pub struct BrokerConfig {
    /// Endpoint, e.g. `ws://localhost:8000`, `mem://`, `surrealkv://.notify/db`.
    pub url: String,
    /// SurrealDB namespace holding the queue.
    pub namespace: String,
    /// SurrealDB database holding the `job` table.
    pub database: String,
    /// Optional root credentials for remote brokers.
    pub username: Option<String>,
    /// Password for `username`.
    pub password: Option<String>,
}

impl BrokerConfig {
    /// Config for `url` with the default namespace/database and no credentials.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            username: None,
            password: None,
        }
    }

    /// Credentials, only when both halves are set.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(u), Some(p)) => Some((u, p)),
            _ => None,
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BROKER_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_broker() {
        let cfg = BrokerConfig::default();
        assert_eq!(cfg.url, "ws://localhost:8000");
        assert_eq!(cfg.namespace, DEFAULT_NAMESPACE);
        assert!(cfg.credentials().is_none());
    }

    #[test]
    fn credentials_need_both_halves() {
        let mut cfg = BrokerConfig::new("mem://");
        cfg.username = Some("root".into());
        assert!(cfg.credentials().is_none());
        cfg.password = Some("secret".into());
        assert_eq!(cfg.credentials(), Some(("root", "secret")));
    }
}
