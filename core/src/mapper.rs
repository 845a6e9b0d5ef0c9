//! 产品数据访问层
//!
//! [`ProductMapper`] 定义产品表的全部读写操作，每个操作只发出一条 SQL，
//! 调用之间不共享事务。[`SqlProductMapper`] 是基于 [`DbPool`] 的实现，
//! 根据连接的驱动类型分发到对应的 [`ProductDialect`]。
//!
//! 未找到记录不是错误：单行查询返回 `Ok(None)`，写操作返回 `Ok(0)`。

use crate::crud;
use crate::db_pool::{DbDriver, DbPool};
#[cfg(any(feature = "mysql", feature = "postgres", feature = "sqlite"))]
use crate::dialect::ProductDialect;
use crate::error::{Result, StoreError};
use crate::models::{now, Product, Status};
use crate::query_builder::{BindValue, QueryBuilder};
use async_trait::async_trait;

/// 根据连接池的驱动选择数据库类型并执行 `$body`
///
/// `$db` 在 `$body` 中是对应的 sqlx 数据库类型，`$p` 是该类型的连接池引用。
macro_rules! dispatch {
    ($pool:expr, |$p:ident, $db:ident| $body:expr) => {
        match $pool.driver() {
            #[cfg(feature = "mysql")]
            DbDriver::MySql => {
                #[allow(dead_code)]
                type $db = sqlx::MySql;
                let $p = $pool.mysql_pool().ok_or(StoreError::NoPoolAvailable)?;
                $body
            }
            #[cfg(feature = "postgres")]
            DbDriver::Postgres => {
                #[allow(dead_code)]
                type $db = sqlx::Postgres;
                let $p = $pool.pg_pool().ok_or(StoreError::NoPoolAvailable)?;
                $body
            }
            #[cfg(feature = "sqlite")]
            DbDriver::Sqlite => {
                #[allow(dead_code)]
                type $db = sqlx::Sqlite;
                let $p = $pool.sqlite_pool().ok_or(StoreError::NoPoolAvailable)?;
                $body
            }
            #[allow(unreachable_patterns)]
            _ => Err(StoreError::NoPoolAvailable),
        }
    };
}

/// 产品表的 SELECT 投影
pub fn select_products() -> String {
    format!(
        "SELECT {} FROM {}",
        Product::COLUMNS.join(", "),
        Product::TABLE
    )
}

/// 上架产品查询的公共前缀：status = 1
fn active_products() -> QueryBuilder {
    QueryBuilder::new(select_products()).and_eq("status", Status::Active.as_i32())
}

/// 按名称排序，同名时按主键排序保证结果稳定
fn ordered_by_name(builder: QueryBuilder) -> QueryBuilder {
    builder.order_by("name", true).order_by("id", true)
}

/// 产品数据访问接口
#[async_trait]
pub trait ProductMapper: Send + Sync {
    /// 插入产品，缺失的时间戳以当前时间补齐，生成的主键写回 `product.id`
    ///
    /// 返回受影响行数（正常为 1）
    async fn insert(&self, product: &mut Product) -> Result<u64>;

    /// 按主键更新产品，只更新库存和更新时间
    ///
    /// `product.updated_at` 为 None 时使用当前时间。主键不存在时返回 0。
    async fn update_by_id(&self, product: &Product) -> Result<u64>;

    /// 按主键删除，主键不存在时返回 0
    async fn delete_by_id(&self, id: i64) -> Result<u64>;

    async fn select_by_id(&self, id: i64) -> Result<Option<Product>>;

    /// 按名称精确查找；存在同名记录时返回主键最小的一条
    async fn select_by_name(&self, name: &str) -> Result<Option<Product>>;

    async fn select_by_name_and_status(&self, name: &str, status: Status)
        -> Result<Option<Product>>;

    /// 所有上架产品，按名称排序
    async fn select_by_status_true_order_by_name(&self) -> Result<Vec<Product>>;

    /// 上架且库存严格大于 `stock` 的产品，按名称排序
    async fn select_by_status_true_and_stock_greater_than(&self, stock: i32)
        -> Result<Vec<Product>>;

    async fn exists_by_name_and_status_true(&self, name: &str) -> Result<bool>;

    /// 同名上架产品的库存是否不少于 `quantity`；没有这样的产品时返回 false
    async fn check_stock_availability(&self, name: &str, quantity: i32) -> Result<bool>;

    async fn select_by_is_seasonal_true_and_status_true_order_by_name(
        &self,
    ) -> Result<Vec<Product>>;

    async fn select_by_is_regional_true_and_status_true_order_by_name(
        &self,
    ) -> Result<Vec<Product>>;

    /// 名称包含 `fragment`（忽略大小写）的上架产品，按名称排序
    async fn select_by_name_containing_ignore_case_and_status_true_order_by_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<Product>>;
}

/// 基于 sqlx 连接池的 ProductMapper
#[derive(Debug, Clone)]
pub struct SqlProductMapper {
    pool: DbPool,
}

impl SqlProductMapper {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn fetch_all(&self, builder: QueryBuilder) -> Result<Vec<Product>> {
        dispatch!(self.pool, |pool, Db| crud::fetch_all::<Db, _>(pool, &builder).await)
    }

    async fn fetch_optional(&self, builder: QueryBuilder) -> Result<Option<Product>> {
        dispatch!(self.pool, |pool, Db| {
            crud::fetch_optional::<Db, _>(pool, &builder).await
        })
    }

    async fn count(&self, builder: QueryBuilder) -> Result<i64> {
        dispatch!(self.pool, |pool, Db| crud::count::<Db, _>(pool, &builder).await)
    }

    async fn execute(&self, sql: &str, binds: Vec<BindValue>) -> Result<u64> {
        dispatch!(self.pool, |pool, Db| {
            crud::execute::<Db, _>(pool, sql, binds).await
        })
    }
}

#[async_trait]
impl ProductMapper for SqlProductMapper {
    async fn insert(&self, product: &mut Product) -> Result<u64> {
        if product.created_at.is_none() {
            product.on_create();
        } else if product.updated_at.is_none() {
            product.updated_at = product.created_at;
        }

        let outcome = dispatch!(self.pool, |pool, Db| {
            Db::insert_product(pool, &*product).await
        })?;
        product.id = Some(outcome.id);
        tracing::info!(id = outcome.id, name = %product.name, "product inserted");
        Ok(outcome.rows_affected)
    }

    async fn update_by_id(&self, product: &Product) -> Result<u64> {
        let id = product.id.ok_or_else(|| {
            StoreError::InvalidField("update_by_id requires a product id".to_string())
        })?;
        let updated_at = product.updated_at.unwrap_or_else(now);
        let rows = self
            .execute(
                "UPDATE products SET stock = ?, updated_at = ? WHERE id = ?",
                vec![
                    BindValue::Int32(product.stock),
                    BindValue::DateTime(updated_at),
                    BindValue::Int64(id),
                ],
            )
            .await?;
        tracing::debug!(id, stock = product.stock, rows, "product stock updated");
        Ok(rows)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64> {
        let rows = self
            .execute("DELETE FROM products WHERE id = ?", vec![BindValue::Int64(id)])
            .await?;
        tracing::info!(id, rows, "product deleted");
        Ok(rows)
    }

    async fn select_by_id(&self, id: i64) -> Result<Option<Product>> {
        self.fetch_optional(QueryBuilder::new(select_products()).and_eq("id", id))
            .await
    }

    async fn select_by_name(&self, name: &str) -> Result<Option<Product>> {
        let builder = QueryBuilder::new(select_products())
            .and_eq("name", name)
            .order_by("id", true)
            .limit(1);
        self.fetch_optional(builder).await
    }

    async fn select_by_name_and_status(
        &self,
        name: &str,
        status: Status,
    ) -> Result<Option<Product>> {
        let builder = QueryBuilder::new(select_products())
            .and_eq("name", name)
            .and_eq("status", status.as_i32())
            .order_by("id", true)
            .limit(1);
        self.fetch_optional(builder).await
    }

    async fn select_by_status_true_order_by_name(&self) -> Result<Vec<Product>> {
        self.fetch_all(ordered_by_name(active_products())).await
    }

    async fn select_by_status_true_and_stock_greater_than(
        &self,
        stock: i32,
    ) -> Result<Vec<Product>> {
        self.fetch_all(ordered_by_name(active_products().and_gt("stock", stock)))
            .await
    }

    async fn exists_by_name_and_status_true(&self, name: &str) -> Result<bool> {
        let count = self.count(active_products().and_eq("name", name)).await?;
        Ok(count > 0)
    }

    async fn check_stock_availability(&self, name: &str, quantity: i32) -> Result<bool> {
        let builder = active_products()
            .and_eq("name", name)
            .and_ge("stock", quantity);
        Ok(self.count(builder).await? > 0)
    }

    async fn select_by_is_seasonal_true_and_status_true_order_by_name(
        &self,
    ) -> Result<Vec<Product>> {
        self.fetch_all(ordered_by_name(active_products().and_eq("is_seasonal", true)))
            .await
    }

    async fn select_by_is_regional_true_and_status_true_order_by_name(
        &self,
    ) -> Result<Vec<Product>> {
        self.fetch_all(ordered_by_name(active_products().and_eq("is_regional", true)))
            .await
    }

    async fn select_by_name_containing_ignore_case_and_status_true_order_by_name(
        &self,
        fragment: &str,
    ) -> Result<Vec<Product>> {
        let builder = active_products().and_contains_ignore_case("name", fragment);
        self.fetch_all(ordered_by_name(builder)).await
    }
}
