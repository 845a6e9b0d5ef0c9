//! 泛型执行层
//!
//! 所有函数都以 `DB: ProductDialect` 为参数，SQL 由 [`QueryBuilder`] 生成，
//! 结果通过 [`ProductDialect`] 的显式解码函数转换为 [`Product`]。

use crate::dialect::ProductDialect;
use crate::error::Result;
use crate::models::Product;
use crate::query_builder::{BindValue, QueryBuilder};
use chrono::NaiveDateTime;
use sqlx::Database;

/// 将绑定值依次应用到查询中
///
/// # 类型参数
///
/// * `DB` - 数据库类型（如 `sqlx::MySql`, `sqlx::Postgres`, `sqlx::Sqlite`）
fn apply_binds<'q, DB>(
    mut query: sqlx::query::Query<'q, DB, DB::Arguments<'q>>,
    binds: Vec<BindValue>,
) -> sqlx::query::Query<'q, DB, DB::Arguments<'q>>
where
    DB: Database,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    NaiveDateTime: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    for bind in binds {
        query = match bind {
            BindValue::String(s) => query.bind(s),
            BindValue::Int64(i) => query.bind(i),
            BindValue::Int32(i) => query.bind(i),
            BindValue::Bool(b) => query.bind(b),
            BindValue::DateTime(dt) => query.bind(dt),
        };
    }
    query
}

/// 查询多条产品记录
///
/// # 示例
///
/// ```rust,ignore
/// let builder = QueryBuilder::new(select_products()).and_eq("status", 1).order_by("name", true);
/// let products = crud::fetch_all::<sqlx::Sqlite, _>(pool, &builder).await?;
/// ```
pub async fn fetch_all<'e, 'c: 'e, DB, E>(executor: E, builder: &QueryBuilder) -> Result<Vec<Product>>
where
    DB: ProductDialect,
    for<'a> DB::Arguments<'a>: sqlx::IntoArguments<'a, DB>,
    E: sqlx::Executor<'c, Database = DB> + Send,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    NaiveDateTime: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    let sql = builder.into_sql(DB::get_driver());
    tracing::debug!(sql = %sql, "fetching products");
    let rows = apply_binds::<DB>(sqlx::query(&sql), builder.binds(DB::get_driver()))
        .fetch_all(executor)
        .await?;
    rows.iter().map(DB::decode_product).collect()
}

/// 查询单条产品记录，未找到时返回 `Ok(None)`
///
/// 调用方负责给 builder 加上排序和 `limit(1)`，这里只取第一行。
pub async fn fetch_optional<'e, 'c: 'e, DB, E>(
    executor: E,
    builder: &QueryBuilder,
) -> Result<Option<Product>>
where
    DB: ProductDialect,
    for<'a> DB::Arguments<'a>: sqlx::IntoArguments<'a, DB>,
    E: sqlx::Executor<'c, Database = DB> + Send,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    NaiveDateTime: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    let sql = builder.into_sql(DB::get_driver());
    tracing::debug!(sql = %sql, "fetching product");
    let row = apply_binds::<DB>(sqlx::query(&sql), builder.binds(DB::get_driver()))
        .fetch_optional(executor)
        .await?;
    row.as_ref().map(DB::decode_product).transpose()
}

/// 统计满足条件的记录数
pub async fn count<'e, 'c: 'e, DB, E>(executor: E, builder: &QueryBuilder) -> Result<i64>
where
    DB: ProductDialect,
    for<'a> DB::Arguments<'a>: sqlx::IntoArguments<'a, DB>,
    E: sqlx::Executor<'c, Database = DB> + Send,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    NaiveDateTime: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    let sql = builder.into_count_sql(DB::get_driver());
    tracing::debug!(sql = %sql, "counting products");
    let row = apply_binds::<DB>(sqlx::query(&sql), builder.binds(DB::get_driver()))
        .fetch_one(executor)
        .await?;
    DB::decode_count(&row)
}

/// 执行写语句（UPDATE / DELETE），返回受影响行数
///
/// `sql` 使用 `?` 作为占位符，按驱动转换后执行。
pub async fn execute<'e, 'c: 'e, DB, E>(
    executor: E,
    sql: &str,
    binds: Vec<BindValue>,
) -> Result<u64>
where
    DB: ProductDialect,
    for<'a> DB::Arguments<'a>: sqlx::IntoArguments<'a, DB>,
    E: sqlx::Executor<'c, Database = DB> + Send,
    String: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i64: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    i32: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    bool: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
    NaiveDateTime: sqlx::Type<DB> + for<'b> sqlx::Encode<'b, DB>,
{
    let sql = DB::get_driver().convert_placeholders(sql);
    tracing::debug!(sql = %sql, "executing statement");
    let result = apply_binds::<DB>(sqlx::query(&sql), binds)
        .execute(executor)
        .await?;
    Ok(DB::rows_affected(&result))
}
