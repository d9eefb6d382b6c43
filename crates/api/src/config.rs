//! Application configuration loaded from environment variables.

use std::str::FromStr;

use chrono::Duration;
use common::CustomerId;

/// Longest accepted idle session lifetime: one year.
const MAX_SESSION_TTL_SECS: i64 = 366 * 86_400;

/// Longest accepted dashboard look-back: one century.
const MAX_WINDOW_DAYS: i64 = 36_500;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `DATABASE_URL`: PostgreSQL connection string; the in-memory store is
///   used when unset
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: `5`)
/// - `ADMIN_CUSTOMER_ID`: customer allowed to set order status (default: `1`)
/// - `SESSION_TTL_SECS`: idle session lifetime (default: `86400`)
/// - `DASHBOARD_WINDOW_DAYS`: look-back for recent orders (default: `30`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub admin_customer_id: CustomerId,
    pub session_ttl_secs: i64,
    pub dashboard_window_days: i64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// Values that fail to parse, or fall outside the accepted range, are
    /// ignored in favour of the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: parsed_var("PORT").unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            database_max_connections: parsed_var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or(defaults.database_max_connections),
            admin_customer_id: parsed_var("ADMIN_CUSTOMER_ID")
                .unwrap_or(defaults.admin_customer_id),
            session_ttl_secs: parsed_var("SESSION_TTL_SECS")
                .filter(|secs| (1..=MAX_SESSION_TTL_SECS).contains(secs))
                .unwrap_or(defaults.session_ttl_secs),
            dashboard_window_days: parsed_var("DASHBOARD_WINDOW_DAYS")
                .filter(|days| (1..=MAX_WINDOW_DAYS).contains(days))
                .unwrap_or(defaults.dashboard_window_days),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Idle session lifetime; an out-of-range value yields the default.
    pub fn session_ttl(&self) -> Duration {
        Some(self.session_ttl_secs)
            .filter(|secs| (1..=MAX_SESSION_TTL_SECS).contains(secs))
            .and_then(Duration::try_seconds)
            .unwrap_or_else(|| Duration::seconds(Self::default().session_ttl_secs))
    }

    /// Dashboard look-back; an out-of-range value yields the default.
    pub fn dashboard_window(&self) -> Duration {
        Some(self.dashboard_window_days)
            .filter(|days| (1..=MAX_WINDOW_DAYS).contains(days))
            .and_then(Duration::try_days)
            .unwrap_or_else(|| Duration::days(domain::DEFAULT_WINDOW_DAYS))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            database_max_connections: 5,
            admin_customer_id: CustomerId::new(1),
            session_ttl_secs: 86_400,
            dashboard_window_days: domain::DEFAULT_WINDOW_DAYS,
        }
    }
}

fn parsed_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.admin_customer_id, CustomerId::new(1));
        assert_eq!(config.session_ttl(), Duration::hours(24));
        assert_eq!(config.dashboard_window(), Duration::days(30));
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_out_of_range_durations_fall_back_to_defaults() {
        let config = Config {
            session_ttl_secs: i64::MAX,
            dashboard_window_days: i64::MAX,
            ..Config::default()
        };
        assert_eq!(config.session_ttl(), Duration::hours(24));
        assert_eq!(config.dashboard_window(), Duration::days(30));

        let config = Config {
            session_ttl_secs: 0,
            dashboard_window_days: -3,
            ..Config::default()
        };
        assert_eq!(config.session_ttl(), Duration::hours(24));
        assert_eq!(config.dashboard_window(), Duration::days(30));
    }

    #[test]
    fn test_largest_accepted_durations_are_kept() {
        let config = Config {
            session_ttl_secs: MAX_SESSION_TTL_SECS,
            dashboard_window_days: MAX_WINDOW_DAYS,
            ..Config::default()
        };
        assert_eq!(config.session_ttl(), Duration::days(366));
        assert_eq!(config.dashboard_window(), Duration::days(MAX_WINDOW_DAYS));
    }

    #[test]
    fn test_unset_variable_parses_to_none() {
        assert_eq!(parsed_var::<u16>("STOREFRONT_TEST_SURELY_UNSET_VAR"), None);
    }
}
