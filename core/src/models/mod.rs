//! 实体模型

pub mod product;
pub mod user;

pub use product::Product;
pub use user::User;

use crate::error::StoreError;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// 状态：0-禁用/下架，1-正常/上架
///
/// 存储为整数，序列化为整数。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Status {
    Disabled,
    #[default]
    Active,
}

impl Status {
    pub fn as_i32(self) -> i32 {
        match self {
            Status::Disabled => 0,
            Status::Active => 1,
        }
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.as_i32()
    }
}

impl TryFrom<i32> for Status {
    type Error = StoreError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Status::Disabled),
            1 => Ok(Status::Active),
            other => Err(StoreError::InvalidField(format!(
                "status must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

/// 当前本地时间，截断到微秒，与数据库时间列的精度保持一致
pub(crate) fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond((now.nanosecond() / 1_000) * 1_000)
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_conversions() {
        assert_eq!(Status::try_from(0).unwrap(), Status::Disabled);
        assert_eq!(Status::try_from(1).unwrap(), Status::Active);
        assert!(matches!(
            Status::try_from(2),
            Err(StoreError::InvalidField(_))
        ));
        assert_eq!(i32::from(Status::Disabled), 0);
        assert_eq!(Status::default(), Status::Active);
    }

    #[test]
    fn test_status_serde_as_integer() {
        assert_eq!(serde_json::to_string(&Status::Active).unwrap(), "1");
        let status: Status = serde_json::from_str("0").unwrap();
        assert_eq!(status, Status::Disabled);
        assert!(serde_json::from_str::<Status>("5").is_err());
    }
}
