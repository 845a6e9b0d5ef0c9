//! 数据库信息抽象层
//!
//! 在类型层面把 sqlx 的数据库类型映射到 [`DbDriver`]，供泛型执行代码
//! 生成占位符和转义标识符。

use crate::db_pool::DbDriver;
use sqlx::Database;

/// 数据库信息 trait
///
/// 每个数据库类型（`sqlx::MySql`, `sqlx::Postgres`, `sqlx::Sqlite`）
/// 只需要给出对应的 `DbDriver`，占位符和转义规则由驱动决定。
pub trait DatabaseInfo: Database {
    /// 获取数据库驱动类型
    fn get_driver() -> DbDriver;

    /// 获取占位符字符串
    ///
    /// * MySQL/SQLite: `"?"`
    /// * PostgreSQL: `"$1"`, `"$2"`, ... (index + 1)
    fn placeholder(index: usize) -> String {
        Self::get_driver().placeholder(index)
    }

    /// 转义 SQL 标识符（表名、列名等）
    ///
    /// * MySQL: `` `name` ``
    /// * PostgreSQL/SQLite: `"name"`
    fn escape_identifier(name: &str) -> String {
        crate::utils::escape_identifier(Self::get_driver(), name)
    }
}

#[cfg(feature = "mysql")]
impl DatabaseInfo for sqlx::MySql {
    fn get_driver() -> DbDriver {
        DbDriver::MySql
    }
}

#[cfg(feature = "postgres")]
impl DatabaseInfo for sqlx::Postgres {
    fn get_driver() -> DbDriver {
        DbDriver::Postgres
    }
}

#[cfg(feature = "sqlite")]
impl DatabaseInfo for sqlx::Sqlite {
    fn get_driver() -> DbDriver {
        DbDriver::Sqlite
    }
}
