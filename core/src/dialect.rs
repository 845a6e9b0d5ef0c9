//! 产品表在各数据库上的差异
//!
//! 列到字段的映射在这里显式完成，每一列按名称读取并解码为字段的类型；
//! 不依赖任何反射或派生宏。价格在 MySQL/PostgreSQL 上是 DECIMAL/NUMERIC，
//! SQLite 没有定点小数，存储为 TEXT。

use crate::database_info::DatabaseInfo;
use crate::error::Result;
#[cfg(feature = "sqlite")]
use crate::error::StoreError;
use crate::models::{Product, Status};
use async_trait::async_trait;
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
use bigdecimal::BigDecimal;
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
use sqlx::Row;
use sqlx::Pool;

/// 插入结果：受影响行数 + 生成的主键
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertOutcome {
    pub rows_affected: u64,
    pub id: i64,
}

/// 产品表的数据库方言
#[async_trait]
pub trait ProductDialect: DatabaseInfo {
    /// 将一行解码为 Product
    fn decode_product(row: &Self::Row) -> Result<Product>;

    /// 解码 `SELECT COUNT(*)` 的结果
    fn decode_count(row: &Self::Row) -> Result<i64>;

    fn rows_affected(result: &Self::QueryResult) -> u64;

    /// 插入一条产品记录并取回自增主键
    async fn insert_product(pool: &Pool<Self>, product: &Product) -> Result<InsertOutcome>;
}

/// 除主键外的全部列组成的 INSERT 语句
pub(crate) fn insert_sql<DB: DatabaseInfo>() -> String {
    let columns = &Product::COLUMNS[1..];
    let column_list = columns
        .iter()
        .map(|c| DB::escape_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (0..columns.len())
        .map(DB::placeholder)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        DB::escape_identifier(Product::TABLE),
        column_list,
        placeholders
    )
}

/// 按列名逐个解码，价格由调用方按方言解码后传入
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
macro_rules! decode_product_row {
    ($row:expr, $price:expr) => {{
        let row = $row;
        Ok(Product {
            id: Some(row.try_get("id")?),
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            price: $price,
            stock: row.try_get("stock")?,
            shelf_time: row.try_get("shelf_time")?,
            preparation_time: row.try_get("preparation_time")?,
            is_seasonal: row.try_get("is_seasonal")?,
            season_start: row.try_get("season_start")?,
            season_end: row.try_get("season_end")?,
            is_regional: row.try_get("is_regional")?,
            available_regions: row.try_get("available_regions")?,
            status: Status::try_from(row.try_get::<i32, _>("status")?)?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }};
}

/// 按 `Product::COLUMNS[1..]` 的顺序绑定字段
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
macro_rules! bind_product_fields {
    ($query:expr, $product:expr, $price:expr) => {
        $query
            .bind($product.name.clone())
            .bind($product.description.clone())
            .bind($price)
            .bind($product.stock)
            .bind($product.shelf_time)
            .bind($product.preparation_time)
            .bind($product.is_seasonal)
            .bind($product.season_start)
            .bind($product.season_end)
            .bind($product.is_regional)
            .bind($product.available_regions.clone())
            .bind($product.status.as_i32())
            .bind($product.created_at)
            .bind($product.updated_at)
    };
}

// ========== MySQL 实现 ==========

#[cfg(feature = "mysql")]
#[async_trait]
impl ProductDialect for sqlx::MySql {
    fn decode_product(row: &sqlx::mysql::MySqlRow) -> Result<Product> {
        decode_product_row!(row, row.try_get::<BigDecimal, _>("price")?)
    }

    fn decode_count(row: &sqlx::mysql::MySqlRow) -> Result<i64> {
        Ok(row.try_get::<i64, _>(0)?)
    }

    fn rows_affected(result: &sqlx::mysql::MySqlQueryResult) -> u64 {
        result.rows_affected()
    }

    async fn insert_product(pool: &Pool<sqlx::MySql>, product: &Product) -> Result<InsertOutcome> {
        let sql = insert_sql::<Self>();
        tracing::debug!(sql = %sql, "inserting product");
        let result = bind_product_fields!(sqlx::query(&sql), product, product.price.clone())
            .execute(pool)
            .await?;
        Ok(InsertOutcome {
            rows_affected: result.rows_affected(),
            id: result.last_insert_id() as i64,
        })
    }
}

// ========== PostgreSQL 实现 ==========

#[cfg(feature = "postgres")]
#[async_trait]
impl ProductDialect for sqlx::Postgres {
    fn decode_product(row: &sqlx::postgres::PgRow) -> Result<Product> {
        decode_product_row!(row, row.try_get::<BigDecimal, _>("price")?)
    }

    fn decode_count(row: &sqlx::postgres::PgRow) -> Result<i64> {
        Ok(row.try_get::<i64, _>(0)?)
    }

    fn rows_affected(result: &sqlx::postgres::PgQueryResult) -> u64 {
        result.rows_affected()
    }

    async fn insert_product(
        pool: &Pool<sqlx::Postgres>,
        product: &Product,
    ) -> Result<InsertOutcome> {
        // PostgreSQL 没有 last_insert_id，用 RETURNING 取回主键
        let sql = format!(
            "{} RETURNING {}",
            insert_sql::<Self>(),
            Self::escape_identifier(Product::PK)
        );
        tracing::debug!(sql = %sql, "inserting product");
        let row = bind_product_fields!(sqlx::query(&sql), product, product.price.clone())
            .fetch_one(pool)
            .await?;
        Ok(InsertOutcome {
            rows_affected: 1,
            id: row.try_get::<i64, _>(0)?,
        })
    }
}

// ========== SQLite 实现 ==========

#[cfg(feature = "sqlite")]
fn parse_price(raw: &str) -> Result<BigDecimal> {
    raw.trim()
        .parse::<BigDecimal>()
        .map_err(|e| StoreError::InvalidField(format!("price '{}' is not a decimal: {}", raw, e)))
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl ProductDialect for sqlx::Sqlite {
    fn decode_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product> {
        let raw_price: String = row.try_get("price")?;
        decode_product_row!(row, parse_price(&raw_price)?)
    }

    fn decode_count(row: &sqlx::sqlite::SqliteRow) -> Result<i64> {
        Ok(row.try_get::<i64, _>(0)?)
    }

    fn rows_affected(result: &sqlx::sqlite::SqliteQueryResult) -> u64 {
        result.rows_affected()
    }

    async fn insert_product(pool: &Pool<sqlx::Sqlite>, product: &Product) -> Result<InsertOutcome> {
        let sql = insert_sql::<Self>();
        tracing::debug!(sql = %sql, "inserting product");
        let result = bind_product_fields!(sqlx::query(&sql), product, product.price.to_string())
            .execute(pool)
            .await?;
        Ok(InsertOutcome {
            rows_affected: result.rows_affected(),
            id: result.last_insert_rowid(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "mysql")]
    #[test]
    fn test_mysql_insert_sql() {
        let sql = insert_sql::<sqlx::MySql>();
        assert!(sql.starts_with("INSERT INTO `products` (`name`, `description`, `price`"));
        assert!(sql.ends_with("`created_at`, `updated_at`) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"));
    }

    #[cfg(feature = "postgres")]
    #[test]
    fn test_postgres_insert_sql() {
        let sql = insert_sql::<sqlx::Postgres>();
        assert!(sql.starts_with("INSERT INTO \"products\" (\"name\""));
        assert!(sql.ends_with("VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"));
        assert!(!sql.contains("\"id\""));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_parse_price() {
        assert_eq!(
            parse_price(" 12.50 ").unwrap(),
            "12.5".parse::<BigDecimal>().unwrap()
        );
        assert!(matches!(
            parse_price("twelve"),
            Err(StoreError::InvalidField(_))
        ));
    }
}
