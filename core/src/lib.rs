pub mod config;
pub mod crud;
pub mod database_info;
pub mod db_pool;
pub mod dialect;
pub mod error;
pub mod mapper;
pub mod models;
pub mod query_builder;
pub mod schema;
pub mod utils;
pub mod validation;

pub use config::DbConfig;
pub use database_info::DatabaseInfo;
pub use db_pool::{DbDriver, DbPool};
pub use dialect::{InsertOutcome, ProductDialect};
pub use error::{Result, StoreError};
pub use mapper::{ProductMapper, SqlProductMapper};
pub use models::{Product, Status, User};
pub use query_builder::{BindValue, QueryBuilder};
pub use schema::create_products_table;
pub use validation::{ValidationErrors, Violation};
