//! 数据库连接配置
//!
//! 可以直接构造，也可以通过 [`DbConfig::from_env`] 从环境变量加载：
//!
//! | 变量 | 默认值 |
//! |---|---|
//! | `DATABASE_URL` | 必填 |
//! | `DATABASE_MAX_CONNECTIONS` | 10 |
//! | `DATABASE_MIN_CONNECTIONS` | 0 |
//! | `DATABASE_ACQUIRE_TIMEOUT_SECS` | 30 |

use crate::error::{Result, StoreError};
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DbConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default)]
    pub min_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
            min_connections: 0,
            acquire_timeout_secs: default_acquire_timeout_secs(),
        }
    }

    /// 从进程环境变量加载配置
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源加载配置，便于测试
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| StoreError::Config("DATABASE_URL is not set".to_string()))?;

        let mut config = Self::new(url);
        if let Some(value) = parse_var::<_, u32>(&lookup, "DATABASE_MAX_CONNECTIONS")? {
            config.max_connections = value;
        }
        if let Some(value) = parse_var::<_, u32>(&lookup, "DATABASE_MIN_CONNECTIONS")? {
            config.min_connections = value;
        }
        if let Some(value) = parse_var::<_, u64>(&lookup, "DATABASE_ACQUIRE_TIMEOUT_SECS")? {
            config.acquire_timeout_secs = value;
        }
        if config.max_connections == 0 {
            return Err(StoreError::Config(
                "DATABASE_MAX_CONNECTIONS must be greater than 0".to_string(),
            ));
        }
        Ok(config)
    }

    /// 是否为 SQLite 内存库；内存库的数据只存在于单个连接中
    pub fn is_in_memory(&self) -> bool {
        self.url.starts_with("sqlite:")
            && (self.url.contains(":memory:") || self.url.contains("mode=memory"))
    }

    pub fn effective_max_connections(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections
        }
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub(crate) fn pool_options<DB: sqlx::Database>(&self) -> sqlx::pool::PoolOptions<DB> {
        let options = sqlx::pool::PoolOptions::<DB>::new()
            .max_connections(self.effective_max_connections())
            .acquire_timeout(self.acquire_timeout());

        if self.is_in_memory() {
            // 唯一的连接一旦被回收，内存库就丢失了
            options
                .min_connections(1)
                .idle_timeout(Option::<Duration>::None)
                .max_lifetime(Option::<Duration>::None)
        } else {
            options.min_connections(self.min_connections.min(self.max_connections))
        }
    }
}

fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| StoreError::Config(format!("{} has an invalid value: {}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DbConfig::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite:orders.db")]))
            .unwrap();
        assert_eq!(config.url, "sqlite:orders.db");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 0);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
        assert!(!config.is_in_memory());
    }

    #[test]
    fn test_overrides() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/orders"),
            ("DATABASE_MAX_CONNECTIONS", "25"),
            ("DATABASE_MIN_CONNECTIONS", " 2 "),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.max_connections, 25);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.acquire_timeout_secs, 5);
    }

    #[test]
    fn test_missing_url() {
        let err = DbConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_invalid_number() {
        let err = DbConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_MAX_CONNECTIONS"));
    }

    #[test]
    fn test_zero_max_connections() {
        let err = DbConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn test_in_memory_pins_single_connection() {
        let config = DbConfig::new("sqlite::memory:");
        assert!(config.is_in_memory());
        assert_eq!(config.effective_max_connections(), 1);

        let shared = DbConfig::new("sqlite:file:orders?mode=memory&cache=shared");
        assert!(shared.is_in_memory());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: DbConfig =
            serde_json::from_str(r#"{"url":"mysql://root@localhost/orders"}"#).unwrap();
        assert_eq!(config, DbConfig::new("mysql://root@localhost/orders"));
    }
}
