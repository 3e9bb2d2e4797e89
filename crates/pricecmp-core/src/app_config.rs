use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Tuning for the nearby-products scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearbySearchConfig {
    /// Number of matches the scan tries to collect.
    pub target_count: usize,
    /// Offers farther than this from the query point are dropped.
    pub max_distance_meters: f64,
    /// Wall-clock budget for one scan.
    pub time_budget: Duration,
}

impl Default for NearbySearchConfig {
    fn default() -> Self {
        Self {
            target_count: 10,
            max_distance_meters: 1000.0,
            time_budget: Duration::from_millis(60_000),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub log_enabled: bool,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub nearby_search: NearbySearchConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("log_enabled", &self.log_enabled)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("nearby_search", &self.nearby_search)
            .finish()
    }
}
