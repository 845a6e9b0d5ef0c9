//! Product
//!
//! 表名: `products`
//! 主键: `id`
//! 字段数: 15

use super::{now, Status};
use crate::validation::{ValidationErrors, Validator};
use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// 产品实体
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// 主键 | id (bigint) | 自增，插入前为 None
    pub id: Option<i64>,
    /// name (varchar(255)) | 非空
    pub name: String,
    /// description (text) | 可空
    pub description: Option<String>,
    /// price (decimal(10,2)) | 非空
    pub price: BigDecimal,
    /// stock (int) | 非空
    pub stock: i32,
    /// shelf_time (int) | 可空 | 保质期（分钟）
    pub shelf_time: Option<i32>,
    /// preparation_time (int) | 可空 | 制作时间（分钟）
    pub preparation_time: Option<i32>,
    /// is_seasonal (boolean) | 非空
    pub is_seasonal: bool,
    /// season_start (date) | 可空
    pub season_start: Option<NaiveDate>,
    /// season_end (date) | 可空
    pub season_end: Option<NaiveDate>,
    /// is_regional (boolean) | 非空
    pub is_regional: bool,
    /// available_regions (varchar(500)) | 可空 | 逗号分隔或 JSON 数组
    pub available_regions: Option<String>,
    /// status (int) | 非空 | 0-下架，1-上架
    pub status: Status,
    /// created_at (datetime) | 非空
    pub created_at: Option<NaiveDateTime>,
    /// updated_at (datetime) | 非空
    pub updated_at: Option<NaiveDateTime>,
}

impl Product {
    pub const TABLE: &'static str = "products";
    pub const PK: &'static str = "id";

    /// 全部列，顺序即 SELECT 的投影顺序
    pub const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "price",
        "stock",
        "shelf_time",
        "preparation_time",
        "is_seasonal",
        "season_start",
        "season_end",
        "is_regional",
        "available_regions",
        "status",
        "created_at",
        "updated_at",
    ];

    pub fn new(name: impl Into<String>, price: BigDecimal, stock: i32) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
            ..Default::default()
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// 创建时同时写入创建时间和更新时间
    pub fn on_create(&mut self) {
        let now = now();
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }

    pub fn on_update(&mut self) {
        self.updated_at = Some(now());
    }

    pub fn shelf_life(&self) -> Option<Duration> {
        self.shelf_time.map(|m| Duration::minutes(i64::from(m)))
    }

    pub fn preparation_duration(&self) -> Option<Duration> {
        self.preparation_time.map(|m| Duration::minutes(i64::from(m)))
    }

    /// 解析可售地区列表，兼容 JSON 数组和逗号分隔两种存储格式
    pub fn regions(&self) -> Vec<String> {
        let raw = match self.available_regions.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Vec::new(),
        };

        if raw.starts_with('[') {
            if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
                return list
                    .into_iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect();
            }
        }

        raw.split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// 以逗号分隔格式写入可售地区，空列表写入 None
    pub fn set_regions<S: AsRef<str>>(&mut self, regions: &[S]) {
        let joined = regions
            .iter()
            .map(|r| r.as_ref().trim())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        self.available_regions = if joined.is_empty() { None } else { Some(joined) };
    }

    /// 非季节性产品全年可售；季节性产品仅在 [season_start, season_end] 内可售，缺失的边界视为开放
    pub fn is_in_season(&self, date: NaiveDate) -> bool {
        if !self.is_seasonal {
            return true;
        }
        let after_start = self.season_start.map_or(true, |start| date >= start);
        let before_end = self.season_end.map_or(true, |end| date <= end);
        after_start && before_end
    }

    /// 非地区限定产品处处可售；地区限定产品按名称（忽略大小写）匹配
    pub fn is_available_in(&self, region: &str) -> bool {
        if !self.is_regional {
            return true;
        }
        let region = region.trim();
        self.regions()
            .iter()
            .any(|r| r.eq_ignore_ascii_case(region))
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Validator::new();
        v.not_blank(&self.name, "name", "product name must not be blank")
            .check(
                self.price >= BigDecimal::from(0),
                "price",
                "price must not be negative",
            )
            .check(self.stock >= 0, "stock", "stock must not be negative")
            .check(
                self.shelf_time.map_or(true, |m| m >= 0),
                "shelfTime",
                "shelf time must not be negative",
            )
            .check(
                self.preparation_time.map_or(true, |m| m >= 0),
                "preparationTime",
                "preparation time must not be negative",
            );

        if self.is_seasonal {
            if let (Some(start), Some(end)) = (self.season_start, self.season_end) {
                v.check(
                    start <= end,
                    "seasonEnd",
                    "season end must not be before season start",
                );
            }
        } else {
            v.check(
                self.season_start.is_none() && self.season_end.is_none(),
                "isSeasonal",
                "season window is only allowed on seasonal products",
            );
        }

        if self.is_regional {
            v.check(
                !self.regions().is_empty(),
                "availableRegions",
                "regional products must list at least one region",
            );
        } else {
            v.check(
                self.available_regions
                    .as_deref()
                    .map_or(true, |r| r.trim().is_empty()),
                "isRegional",
                "available regions are only allowed on regional products",
            );
        }

        v.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn tea() -> Product {
        Product::new("Milk Tea", BigDecimal::from_str("12.50").unwrap(), 100)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_defaults() {
        let p = tea();
        assert_eq!(p.id, None);
        assert!(p.is_active());
        assert!(!p.is_seasonal);
        assert!(!p.is_regional);
        assert!(p.created_at.is_none());
    }

    #[test]
    fn test_lifecycle_stamps() {
        let mut p = tea();
        p.on_create();
        assert!(p.created_at.is_some());
        assert_eq!(p.created_at, p.updated_at);

        let created = p.created_at;
        p.on_update();
        assert_eq!(p.created_at, created);
        assert!(p.updated_at >= created);
    }

    #[test]
    fn test_durations() {
        let mut p = tea();
        p.shelf_time = Some(30);
        p.preparation_time = Some(5);
        assert_eq!(p.shelf_life(), Some(Duration::minutes(30)));
        assert_eq!(p.preparation_duration(), Some(Duration::minutes(5)));
    }

    #[test]
    fn test_regions_formats() {
        let mut p = tea();
        assert!(p.regions().is_empty());

        p.available_regions = Some("Hangzhou, Shanghai,,".to_string());
        assert_eq!(p.regions(), vec!["Hangzhou", "Shanghai"]);

        p.available_regions = Some(r#"["Beijing", " Shenzhen "]"#.to_string());
        assert_eq!(p.regions(), vec!["Beijing", "Shenzhen"]);

        p.set_regions(&["Chengdu", " ", "Wuhan"]);
        assert_eq!(p.available_regions.as_deref(), Some("Chengdu,Wuhan"));

        p.set_regions::<&str>(&[]);
        assert_eq!(p.available_regions, None);
    }

    #[test]
    fn test_is_in_season() {
        let mut p = tea();
        assert!(p.is_in_season(date(2025, 1, 1)));

        p.is_seasonal = true;
        p.season_start = Some(date(2025, 6, 1));
        p.season_end = Some(date(2025, 8, 31));
        assert!(p.is_in_season(date(2025, 6, 1)));
        assert!(p.is_in_season(date(2025, 8, 31)));
        assert!(!p.is_in_season(date(2025, 9, 1)));
        assert!(!p.is_in_season(date(2025, 5, 31)));

        p.season_end = None;
        assert!(p.is_in_season(date(2030, 1, 1)));
    }

    #[test]
    fn test_is_available_in() {
        let mut p = tea();
        assert!(p.is_available_in("anywhere"));

        p.is_regional = true;
        p.set_regions(&["Hangzhou", "Shanghai"]);
        assert!(p.is_available_in("hangzhou"));
        assert!(p.is_available_in(" Shanghai "));
        assert!(!p.is_available_in("Beijing"));
    }

    #[test]
    fn test_validate_ok() {
        let mut p = tea();
        p.is_seasonal = true;
        p.season_start = Some(date(2025, 6, 1));
        p.season_end = Some(date(2025, 8, 31));
        p.is_regional = true;
        p.set_regions(&["Hangzhou"]);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_validate_violations() {
        let mut p = Product::new(" ", BigDecimal::from(-1), -5);
        p.season_start = Some(date(2025, 6, 1));
        p.available_regions = Some("Hangzhou".to_string());
        let err = p.validate().unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("price"));
        assert!(err.has_field("stock"));
        assert!(err.has_field("isSeasonal"));
        assert!(err.has_field("isRegional"));
    }

    #[test]
    fn test_validate_inverted_season_and_missing_regions() {
        let mut p = tea();
        p.is_seasonal = true;
        p.season_start = Some(date(2025, 9, 1));
        p.season_end = Some(date(2025, 6, 1));
        p.is_regional = true;
        let err = p.validate().unwrap_err();
        assert_eq!(err.len(), 2);
        assert!(err.has_field("seasonEnd"));
        assert!(err.has_field("availableRegions"));
    }

    #[test]
    fn test_serde_camel_case() {
        let mut p = tea();
        p.shelf_time = Some(30);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["shelfTime"], 30);
        assert_eq!(json["isSeasonal"], false);
        assert_eq!(json["status"], 1);

        let back: Product = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
