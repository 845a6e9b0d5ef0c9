use crate::db_pool::DbDriver;
use crate::utils::{escape_identifier, escape_like};
use chrono::NaiveDateTime;
use std::fmt::Write;

/// 绑定值，用于安全地传递参数
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    String(String),
    Int64(i64),
    Int32(i32),
    Bool(bool),
    DateTime(NaiveDateTime),
}

/// SQL 操作符枚举
#[derive(Debug, Clone, PartialEq)]
enum Operator {
    /// 等于: =
    Eq,
    /// 大于: >
    Gt,
    /// 大于等于: >=
    Ge,
    /// 忽略大小写的子串匹配: LOWER(field) LIKE ? ESCAPE '\'
    ContainsIgnoreCase,
}

impl Operator {
    /// 生成单个条件的 SQL
    fn to_sql(&self, driver: DbDriver, field: &str, bind_index: &mut usize) -> String {
        let escaped_field = escape_identifier(driver, field);
        let placeholder = driver.placeholder(*bind_index);
        *bind_index += 1;
        match self {
            Operator::Eq => format!("{} = {}", escaped_field, placeholder),
            Operator::Gt => format!("{} > {}", escaped_field, placeholder),
            Operator::Ge => format!("{} >= {}", escaped_field, placeholder),
            Operator::ContainsIgnoreCase => format!(
                "LOWER({}) LIKE {} {}",
                escaped_field,
                placeholder,
                driver.like_escape_clause()
            ),
        }
    }
}

/// 安全的查询构建器，使用绑定参数而非字符串拼接
///
/// 所有条件之间以 AND 连接。
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_sql: String,
    conditions: Vec<(String, Operator)>,
    order_by: Vec<(String, bool)>, // (field, ascending)
    binds: Vec<BindValue>,
    limit: Option<u64>,
}

impl QueryBuilder {
    pub fn new(base_sql: impl Into<String>) -> Self {
        Self {
            base_sql: base_sql.into(),
            conditions: Vec::new(),
            order_by: Vec::new(),
            binds: Vec::new(),
            limit: None,
        }
    }

    /// 设置 LIMIT（链式调用）
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn and_eq(mut self, field: &str, value: impl Into<BindValue>) -> Self {
        self.conditions.push((field.to_string(), Operator::Eq));
        self.binds.push(value.into());
        self
    }

    pub fn and_gt(mut self, field: &str, value: impl Into<BindValue>) -> Self {
        self.conditions.push((field.to_string(), Operator::Gt));
        self.binds.push(value.into());
        self
    }

    pub fn and_ge(mut self, field: &str, value: impl Into<BindValue>) -> Self {
        self.conditions.push((field.to_string(), Operator::Ge));
        self.binds.push(value.into());
        self
    }

    /// 忽略大小写的包含匹配（%value%），value 中的通配符按字面匹配
    ///
    /// 原始片段先保存下来，LIKE 模式在 [`QueryBuilder::binds`] 中按驱动生成
    pub fn and_contains_ignore_case(mut self, field: &str, value: &str) -> Self {
        self.conditions
            .push((field.to_string(), Operator::ContainsIgnoreCase));
        self.binds.push(BindValue::String(value.to_string()));
        self
    }

    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.order_by.push((field.to_string(), ascending));
        self
    }

    /// 生成 WHERE 条件部分的 SQL（不包含 WHERE 关键字）
    fn build_conditions_sql(&self, driver: DbDriver) -> String {
        let mut bind_index = 0;
        self.conditions
            .iter()
            .map(|(field, op)| op.to_sql(driver, field, &mut bind_index))
            .collect::<Vec<_>>()
            .join(" AND ")
    }

    fn push_where(&self, sql: &mut String, driver: DbDriver) {
        if self.conditions.is_empty() {
            return;
        }
        // 检查 base_sql 是否已经包含 WHERE
        if find_ignore_ascii_case(sql, " WHERE ").is_some() {
            sql.push_str(" AND ");
        } else {
            sql.push_str(" WHERE ");
        }
        sql.push_str(&self.build_conditions_sql(driver));
    }

    pub fn into_sql(&self, driver: DbDriver) -> String {
        let mut sql = self.base_sql.clone();
        self.push_where(&mut sql, driver);

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            for (i, (field, ascending)) in self.order_by.iter().enumerate() {
                if i > 0 {
                    sql.push_str(", ");
                }
                sql.push_str(&escape_identifier(driver, field));
                if !ascending {
                    sql.push_str(" DESC");
                }
            }
        }

        if let Some(limit) = self.limit {
            // 写入 String 不会失败
            let _ = write!(sql, " LIMIT {}", limit);
        }

        sql
    }

    /// 将 SELECT ... FROM 转换为 SELECT COUNT(*) FROM，忽略排序和 LIMIT
    pub fn into_count_sql(&self, driver: DbDriver) -> String {
        let base = &self.base_sql;
        let mut sql = if let Some(from_pos) = find_ignore_ascii_case(base, " FROM ") {
            format!("SELECT COUNT(*){}", &base[from_pos..])
        } else {
            format!("SELECT COUNT(*) FROM ({}) AS count_query", base)
        };
        self.push_where(&mut sql, driver);
        sql
    }

    /// 返回所有绑定值，顺序与占位符一致
    ///
    /// 包含匹配的片段按驱动的 LOWER() 规则转小写，再转义通配符
    pub fn binds(&self, driver: DbDriver) -> Vec<BindValue> {
        self.conditions
            .iter()
            .zip(&self.binds)
            .map(|((_, op), bind)| match (op, bind) {
                (Operator::ContainsIgnoreCase, BindValue::String(value)) => BindValue::String(
                    format!("%{}%", escape_like(&driver.to_lower(value))),
                ),
                _ => bind.clone(),
            })
            .collect()
    }
}

/// 忽略 ASCII 大小写查找关键字，返回原字符串中的字节位置
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
}

impl From<String> for BindValue {
    fn from(s: String) -> Self {
        BindValue::String(s)
    }
}

impl From<&str> for BindValue {
    fn from(s: &str) -> Self {
        BindValue::String(s.to_string())
    }
}

impl From<i64> for BindValue {
    fn from(i: i64) -> Self {
        BindValue::Int64(i)
    }
}

impl From<i32> for BindValue {
    fn from(i: i32) -> Self {
        BindValue::Int32(i)
    }
}

impl From<bool> for BindValue {
    fn from(b: bool) -> Self {
        BindValue::Bool(b)
    }
}

impl From<NaiveDateTime> for BindValue {
    fn from(dt: NaiveDateTime) -> Self {
        BindValue::DateTime(dt)
    }
}
