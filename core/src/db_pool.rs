use crate::config::DbConfig;
use crate::error::{Result, StoreError};
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
use sqlx::Pool;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbDriver {
    MySql,
    Postgres,
    Sqlite,
}

impl DbDriver {
    pub fn from_url(url: &str) -> Result<Self> {
        if url.starts_with("mysql://") || url.starts_with("mariadb://") {
            Ok(DbDriver::MySql)
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DbDriver::Postgres)
        } else if url.starts_with("sqlite://") || url.starts_with("sqlite:") {
            Ok(DbDriver::Sqlite)
        } else {
            Err(StoreError::UnsupportedDatabase(url.to_string()))
        }
    }

    pub fn placeholder(&self, index: usize) -> String {
        match self {
            DbDriver::MySql | DbDriver::Sqlite => "?".to_string(),
            DbDriver::Postgres => format!("${}", index + 1),
        }
    }

    pub fn convert_placeholders(&self, sql: &str) -> String {
        match self {
            DbDriver::MySql | DbDriver::Sqlite => sql.to_string(),
            DbDriver::Postgres => {
                let mut result = String::with_capacity(sql.len());
                let mut index = 0;
                for ch in sql.chars() {
                    if ch == '?' {
                        index += 1;
                        result.push_str(&format!("${}", index));
                    } else {
                        result.push(ch);
                    }
                }
                result
            }
        }
    }

    /// LIKE 的 ESCAPE 子句，转义字符统一为反斜杠
    ///
    /// MySQL 字符串字面量里反斜杠本身需要再转义一次
    pub fn like_escape_clause(&self) -> &'static str {
        match self {
            DbDriver::MySql => "ESCAPE '\\\\'",
            DbDriver::Postgres | DbDriver::Sqlite => "ESCAPE '\\'",
        }
    }

    /// 与数据库 LOWER() 一致的小写转换
    ///
    /// SQLite 内置的 LOWER() 只转换 ASCII 字母
    pub fn to_lower(&self, value: &str) -> String {
        match self {
            DbDriver::Sqlite => value.to_ascii_lowercase(),
            DbDriver::MySql | DbDriver::Postgres => value.to_lowercase(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DbPool {
    driver: DbDriver,
    #[cfg(feature = "mysql")]
    mysql: Option<Arc<Pool<sqlx::MySql>>>,
    #[cfg(feature = "postgres")]
    pg: Option<Arc<Pool<sqlx::Postgres>>>,
    #[cfg(feature = "sqlite")]
    sqlite: Option<Arc<Pool<sqlx::Sqlite>>>,
}

impl DbPool {
    /// 从数据库 URL 连接并创建 DbPool，连接池参数使用默认值
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with(&DbConfig::new(url)).await
    }

    /// 按配置连接数据库并创建 DbPool
    pub async fn connect_with(config: &DbConfig) -> Result<Self> {
        let driver = DbDriver::from_url(&config.url)?;
        tracing::info!(
            driver = ?driver,
            max_connections = config.effective_max_connections(),
            "connecting to database"
        );

        match driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = config
                    .pool_options::<sqlx::MySql>()
                    .connect(&config.url)
                    .await?;
                Self::from_mysql_pool(Arc::new(pool))
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                let pool = config
                    .pool_options::<sqlx::Postgres>()
                    .connect(&config.url)
                    .await?;
                Self::from_postgres_pool(Arc::new(pool))
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = config
                    .pool_options::<sqlx::Sqlite>()
                    .connect(&config.url)
                    .await?;
                Self::from_sqlite_pool(Arc::new(pool))
            }
            #[allow(unreachable_patterns)]
            _ => Err(StoreError::UnsupportedDatabase(format!(
                "Unsupported database driver, only mysql, postgres, sqlite is supported, got: {:?}",
                driver
            ))),
        }
    }

    /// 从 MySQL Pool 创建 DbPool
    #[cfg(feature = "mysql")]
    pub fn from_mysql_pool(pool: Arc<Pool<sqlx::MySql>>) -> Result<Self> {
        Ok(Self {
            driver: DbDriver::MySql,
            mysql: Some(pool),
            #[cfg(feature = "postgres")]
            pg: None,
            #[cfg(feature = "sqlite")]
            sqlite: None,
        })
    }

    /// 从 PostgreSQL Pool 创建 DbPool
    #[cfg(feature = "postgres")]
    pub fn from_postgres_pool(pool: Arc<Pool<sqlx::Postgres>>) -> Result<Self> {
        Ok(Self {
            driver: DbDriver::Postgres,
            #[cfg(feature = "mysql")]
            mysql: None,
            pg: Some(pool),
            #[cfg(feature = "sqlite")]
            sqlite: None,
        })
    }

    /// 从 SQLite Pool 创建 DbPool
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite_pool(pool: Arc<Pool<sqlx::Sqlite>>) -> Result<Self> {
        Ok(Self {
            driver: DbDriver::Sqlite,
            #[cfg(feature = "mysql")]
            mysql: None,
            #[cfg(feature = "postgres")]
            pg: None,
            sqlite: Some(pool),
        })
    }

    pub fn driver(&self) -> DbDriver {
        self.driver
    }

    #[cfg(feature = "mysql")]
    pub fn mysql_pool(&self) -> Option<&Pool<sqlx::MySql>> {
        self.mysql.as_deref()
    }

    #[cfg(feature = "postgres")]
    pub fn pg_pool(&self) -> Option<&Pool<sqlx::Postgres>> {
        self.pg.as_deref()
    }

    #[cfg(feature = "sqlite")]
    pub fn sqlite_pool(&self) -> Option<&Pool<sqlx::Sqlite>> {
        self.sqlite.as_deref()
    }

    pub fn convert_sql(&self, sql: &str) -> String {
        self.driver.convert_placeholders(sql)
    }

    /// 执行不带参数的语句（建表等），返回受影响行数
    pub async fn execute(&self, sql: &str) -> Result<u64> {
        let sql = self.convert_sql(sql);
        tracing::debug!(sql = %sql, "executing statement");
        match self.driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                let pool = self.mysql.as_deref().ok_or(StoreError::NoPoolAvailable)?;
                let result = sqlx::query(&sql).execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                let pool = self.pg.as_deref().ok_or(StoreError::NoPoolAvailable)?;
                let result = sqlx::query(&sql).execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                let pool = self.sqlite.as_deref().ok_or(StoreError::NoPoolAvailable)?;
                let result = sqlx::query(&sql).execute(pool).await?;
                Ok(result.rows_affected())
            }
            #[allow(unreachable_patterns)]
            _ => Err(StoreError::NoPoolAvailable),
        }
    }

    /// 关闭底层连接池
    pub async fn close(&self) {
        match self.driver {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                if let Some(pool) = self.mysql.as_deref() {
                    pool.close().await;
                }
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                if let Some(pool) = self.pg.as_deref() {
                    pool.close().await;
                }
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                if let Some(pool) = self.sqlite.as_deref() {
                    pool.close().await;
                }
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_url() {
        assert_eq!(
            DbDriver::from_url("mysql://root@localhost/orders").unwrap(),
            DbDriver::MySql
        );
        assert_eq!(
            DbDriver::from_url("mariadb://root@localhost/orders").unwrap(),
            DbDriver::MySql
        );
        assert_eq!(
            DbDriver::from_url("postgresql://localhost/orders").unwrap(),
            DbDriver::Postgres
        );
        assert_eq!(
            DbDriver::from_url("sqlite::memory:").unwrap(),
            DbDriver::Sqlite
        );
        assert!(matches!(
            DbDriver::from_url("oracle://localhost"),
            Err(StoreError::UnsupportedDatabase(_))
        ));
    }

    #[test]
    fn test_convert_placeholders() {
        let sql = "UPDATE products SET stock = ?, updated_at = ? WHERE id = ?";
        assert_eq!(DbDriver::MySql.convert_placeholders(sql), sql);
        assert_eq!(
            DbDriver::Postgres.convert_placeholders(sql),
            "UPDATE products SET stock = $1, updated_at = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_like_escape_clause() {
        assert_eq!(DbDriver::MySql.like_escape_clause(), r"ESCAPE '\\'");
        assert_eq!(DbDriver::Postgres.like_escape_clause(), r"ESCAPE '\'");
        assert_eq!(DbDriver::Sqlite.like_escape_clause(), r"ESCAPE '\'");
    }

    #[test]
    fn test_to_lower_matches_backend() {
        assert_eq!(DbDriver::Sqlite.to_lower("Éclair TEA"), "Éclair tea");
        assert_eq!(DbDriver::Postgres.to_lower("Éclair TEA"), "éclair tea");
        assert_eq!(DbDriver::MySql.to_lower("ÉCLAIR"), "éclair");
    }
}
