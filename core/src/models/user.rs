//! User
//!
//! 仅作为数据传输结构，当前没有对应的持久化操作。

use super::{now, Status};
use crate::validation::{ValidationErrors, Validator};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 用户实体
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// 必填
    pub id: Option<i64>,
    /// 必填，不能为空白
    pub username: String,
    /// 11 位大陆手机号，可空
    pub phone: Option<String>,
    /// 邮箱，可空
    pub email: Option<String>,
    pub nickname: Option<String>,
    /// 0-禁用，1-正常
    #[serde(default)]
    pub status: Status,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl User {
    /// 创建用户，状态为正常并写入两个时间戳
    pub fn new(
        id: i64,
        username: impl Into<String>,
        phone: Option<String>,
        email: Option<String>,
        nickname: Option<String>,
    ) -> Self {
        let mut user = Self {
            id: Some(id),
            username: username.into(),
            phone,
            email,
            nickname,
            status: Status::Active,
            created_at: None,
            updated_at: None,
        };
        user.on_create();
        user
    }

    pub fn on_create(&mut self) {
        let now = now();
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }

    pub fn on_update(&mut self) {
        self.updated_at = Some(now());
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .not_null(self.id.as_ref(), "id", "user id must not be null")
            .not_blank(&self.username, "username", "username must not be blank")
            .phone(self.phone.as_deref(), "phone", "invalid phone number format")
            .email(self.email.as_deref(), "email", "invalid email format")
            .finish()
    }
}
