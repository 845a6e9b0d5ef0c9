//! 工具函数模块

use crate::db_pool::DbDriver;

/// 转义 SQL 标识符
pub fn escape_identifier(driver: DbDriver, name: &str) -> String {
    match driver {
        DbDriver::MySql => format!("`{}`", name),
        DbDriver::Postgres => format!("\"{}\"", name),
        DbDriver::Sqlite => format!("\"{}\"", name),
    }
}

/// 转义 LIKE 模式中的通配符，使 `%`、`_` 和 `\` 按字面匹配
///
/// 需要配合 `ESCAPE '\'` 子句使用，见 [`DbDriver::like_escape_clause`]
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
