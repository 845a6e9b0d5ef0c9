//! 建表语句
//!
//! 各数据库的列类型：
//!
//! | 字段 | MySQL | PostgreSQL | SQLite |
//! |------|-------|------------|--------|
//! | id | BIGINT AUTO_INCREMENT | BIGSERIAL | INTEGER AUTOINCREMENT |
//! | price | DECIMAL(10,2) | NUMERIC(10,2) | TEXT |
//! | is_* | TINYINT(1) | BOOLEAN | BOOLEAN |
//! | *_at | DATETIME(6) | TIMESTAMP | TEXT |
//!
//! SQLite 的 NUMERIC 亲和性会把价格转成浮点数，所以用 TEXT 保存十进制字符串。

use crate::db_pool::{DbDriver, DbPool};
use crate::error::Result;
use crate::utils::escape_identifier;

const INDEX_NAME: &str = "idx_products_name";

fn column_types(driver: DbDriver) -> [(&'static str, &'static str); 15] {
    match driver {
        DbDriver::MySql => [
            ("id", "BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY"),
            ("name", "VARCHAR(255) NOT NULL"),
            ("description", "TEXT NULL"),
            ("price", "DECIMAL(10,2) NOT NULL"),
            ("stock", "INT NOT NULL DEFAULT 0"),
            ("shelf_time", "INT NULL"),
            ("preparation_time", "INT NULL"),
            ("is_seasonal", "TINYINT(1) NOT NULL DEFAULT 0"),
            ("season_start", "DATE NULL"),
            ("season_end", "DATE NULL"),
            ("is_regional", "TINYINT(1) NOT NULL DEFAULT 0"),
            ("available_regions", "VARCHAR(500) NULL"),
            ("status", "INT NOT NULL DEFAULT 1"),
            ("created_at", "DATETIME(6) NOT NULL"),
            ("updated_at", "DATETIME(6) NOT NULL"),
        ],
        DbDriver::Postgres => [
            ("id", "BIGSERIAL PRIMARY KEY"),
            ("name", "VARCHAR(255) NOT NULL"),
            ("description", "TEXT"),
            ("price", "NUMERIC(10,2) NOT NULL"),
            ("stock", "INTEGER NOT NULL DEFAULT 0"),
            ("shelf_time", "INTEGER"),
            ("preparation_time", "INTEGER"),
            ("is_seasonal", "BOOLEAN NOT NULL DEFAULT FALSE"),
            ("season_start", "DATE"),
            ("season_end", "DATE"),
            ("is_regional", "BOOLEAN NOT NULL DEFAULT FALSE"),
            ("available_regions", "VARCHAR(500)"),
            ("status", "INTEGER NOT NULL DEFAULT 1"),
            ("created_at", "TIMESTAMP NOT NULL"),
            ("updated_at", "TIMESTAMP NOT NULL"),
        ],
        DbDriver::Sqlite => [
            ("id", "INTEGER PRIMARY KEY AUTOINCREMENT"),
            ("name", "TEXT NOT NULL"),
            ("description", "TEXT"),
            ("price", "TEXT NOT NULL"),
            ("stock", "INTEGER NOT NULL DEFAULT 0"),
            ("shelf_time", "INTEGER"),
            ("preparation_time", "INTEGER"),
            ("is_seasonal", "BOOLEAN NOT NULL DEFAULT 0"),
            ("season_start", "TEXT"),
            ("season_end", "TEXT"),
            ("is_regional", "BOOLEAN NOT NULL DEFAULT 0"),
            ("available_regions", "TEXT"),
            ("status", "INTEGER NOT NULL DEFAULT 1"),
            ("created_at", "TEXT NOT NULL"),
            ("updated_at", "TEXT NOT NULL"),
        ],
    }
}

/// products 表的建表语句，按执行顺序返回
///
/// MySQL 不支持 `CREATE INDEX IF NOT EXISTS`，名称索引写在建表语句里；
/// 其余数据库单独建索引。
pub fn products_ddl(driver: DbDriver) -> Vec<String> {
    let table = escape_identifier(driver, "products");
    let mut column_defs: Vec<String> = column_types(driver)
        .iter()
        .map(|(name, ty)| format!("    {} {}", escape_identifier(driver, name), ty))
        .collect();

    match driver {
        DbDriver::MySql => {
            column_defs.push(format!(
                "    INDEX {} ({})",
                escape_identifier(driver, INDEX_NAME),
                escape_identifier(driver, "name")
            ));
            vec![format!(
                "CREATE TABLE IF NOT EXISTS {} (\n{}\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4",
                table,
                column_defs.join(",\n")
            )]
        }
        DbDriver::Postgres | DbDriver::Sqlite => vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
                table,
                column_defs.join(",\n")
            ),
            format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
                escape_identifier(driver, INDEX_NAME),
                table,
                escape_identifier(driver, "name")
            ),
        ],
    }
}

/// 创建 products 表（已存在时不做任何事）
pub async fn create_products_table(pool: &DbPool) -> Result<()> {
    for statement in products_ddl(pool.driver()) {
        pool.execute(&statement).await?;
    }
    tracing::info!(driver = ?pool.driver(), "products table ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    #[test]
    fn test_every_column_is_declared() {
        for driver in [DbDriver::MySql, DbDriver::Postgres, DbDriver::Sqlite] {
            let names: Vec<&str> = column_types(driver).iter().map(|(n, _)| *n).collect();
            assert_eq!(names, Product::COLUMNS, "{:?}", driver);
        }
    }

    #[test]
    fn test_mysql_ddl_inlines_index() {
        let ddl = products_ddl(DbDriver::MySql);
        assert_eq!(ddl.len(), 1);
        assert!(ddl[0].starts_with("CREATE TABLE IF NOT EXISTS `products` ("));
        assert!(ddl[0].contains("`price` DECIMAL(10,2) NOT NULL"));
        assert!(ddl[0].contains("INDEX `idx_products_name` (`name`)"));
    }

    #[test]
    fn test_postgres_ddl() {
        let ddl = products_ddl(DbDriver::Postgres);
        assert_eq!(ddl.len(), 2);
        assert!(ddl[0].contains("\"id\" BIGSERIAL PRIMARY KEY"));
        assert_eq!(
            ddl[1],
            "CREATE INDEX IF NOT EXISTS \"idx_products_name\" ON \"products\" (\"name\")"
        );
    }

    #[test]
    fn test_sqlite_price_is_text() {
        let ddl = products_ddl(DbDriver::Sqlite);
        assert!(ddl[0].contains("\"price\" TEXT NOT NULL"));
        assert!(ddl[0].contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
    }
}
