//! 边界校验
//!
//! 校验函数不会在第一个错误处停下，而是收集全部违规项，
//! 以 [`ValidationErrors`] 的形式一次性返回给调用方。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// 中国大陆 11 位手机号
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^1[3-9]\d{9}$").unwrap());

/// WHATWG HTML 规范中的邮箱格式
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$",
    )
    .unwrap()
});

/// 单条违规：字段名 + 错误信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    violations: Vec<Violation>,
}

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// 是否包含指定字段的违规
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", v.field, v.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// 违规收集器
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<Violation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 条件不成立时记录一条违规
    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) -> &mut Self {
        if !ok {
            self.violations.push(Violation {
                field,
                message: message.to_string(),
            });
        }
        self
    }

    pub fn not_null<T>(&mut self, value: Option<&T>, field: &'static str, message: &str) -> &mut Self {
        self.check(value.is_some(), field, message)
    }

    pub fn not_blank(&mut self, value: &str, field: &'static str, message: &str) -> &mut Self {
        self.check(!value.trim().is_empty(), field, message)
    }

    /// 值存在时才校验格式，None 视为合法
    pub fn phone(&mut self, value: Option<&str>, field: &'static str, message: &str) -> &mut Self {
        self.check(value.map_or(true, is_valid_phone), field, message)
    }

    /// 值存在时才校验格式，None 视为合法
    pub fn email(&mut self, value: Option<&str>, field: &'static str, message: &str) -> &mut Self {
        self.check(value.map_or(true, is_valid_email), field, message)
    }

    pub fn finish(&mut self) -> Result<(), ValidationErrors> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                violations: std::mem::take(&mut self.violations),
            })
        }
    }
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_RE.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}
