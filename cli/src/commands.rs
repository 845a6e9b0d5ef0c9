use anyhow::{bail, Context, Result};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use clap::Args;
use orderstore::{Product, ProductMapper, Status, User};
use serde_json::{json, Value};

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub name: String,
    /// Decimal price, e.g. 18.80
    #[arg(long)]
    pub price: BigDecimal,
    #[arg(long, default_value_t = 0)]
    pub stock: i32,
    #[arg(long)]
    pub description: Option<String>,
    /// Shelf life in minutes
    #[arg(long)]
    pub shelf_time: Option<i32>,
    /// Preparation time in minutes
    #[arg(long)]
    pub preparation_time: Option<i32>,
    /// Season window start (YYYY-MM-DD); implies a seasonal product
    #[arg(long)]
    pub season_start: Option<NaiveDate>,
    /// Season window end (YYYY-MM-DD); implies a seasonal product
    #[arg(long)]
    pub season_end: Option<NaiveDate>,
    #[arg(long)]
    pub seasonal: bool,
    /// Comma separated regions; implies a regional product
    #[arg(long, value_delimiter = ',')]
    pub regions: Vec<String>,
    /// Store the product as disabled
    #[arg(long)]
    pub disabled: bool,
}

impl AddArgs {
    fn into_product(self) -> Product {
        let mut product = Product::new(self.name, self.price, self.stock);
        product.description = self.description;
        product.shelf_time = self.shelf_time;
        product.preparation_time = self.preparation_time;
        product.is_seasonal =
            self.seasonal || self.season_start.is_some() || self.season_end.is_some();
        product.season_start = self.season_start;
        product.season_end = self.season_end;
        product.is_regional = !self.regions.is_empty();
        product.set_regions(&self.regions);
        if self.disabled {
            product.status = Status::Disabled;
        }
        product
    }
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[arg(long, conflicts_with = "name", required_unless_present = "name")]
    pub id: Option<i64>,
    #[arg(long)]
    pub name: Option<String>,
    /// Restrict a name lookup to this status (0 or 1)
    #[arg(long, requires = "name")]
    pub status: Option<i32>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only products with stock strictly greater than N
    #[arg(long, value_name = "N", conflicts_with_all = ["seasonal", "regional", "search"])]
    pub min_stock: Option<i32>,
    #[arg(long, conflicts_with_all = ["regional", "search"])]
    pub seasonal: bool,
    #[arg(long, conflicts_with = "search")]
    pub regional: bool,
    /// Case-insensitive name fragment
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct UserArgs {
    #[arg(long)]
    pub id: Option<i64>,
    #[arg(long, default_value = "")]
    pub username: String,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub nickname: Option<String>,
}

pub async fn add(mapper: &impl ProductMapper, args: AddArgs) -> Result<Value> {
    let mut product = args.into_product();
    product
        .validate()
        .map_err(orderstore::StoreError::from)
        .context("Product rejected")?;
    mapper.insert(&mut product).await?;
    Ok(serde_json::to_value(&product)?)
}

pub async fn get(mapper: &impl ProductMapper, args: GetArgs) -> Result<Value> {
    let product = match (args.id, args.name, args.status) {
        (Some(id), _, _) => mapper.select_by_id(id).await?,
        (None, Some(name), Some(status)) => {
            let status = Status::try_from(status)?;
            mapper.select_by_name_and_status(&name, status).await?
        }
        (None, Some(name), None) => mapper.select_by_name(&name).await?,
        (None, None, _) => bail!("either --id or --name is required"),
    };
    Ok(serde_json::to_value(&product)?)
}

pub async fn list(mapper: &impl ProductMapper, args: ListArgs) -> Result<Value> {
    let products = if let Some(fragment) = args.search {
        mapper
            .select_by_name_containing_ignore_case_and_status_true_order_by_name(&fragment)
            .await?
    } else if args.seasonal {
        mapper
            .select_by_is_seasonal_true_and_status_true_order_by_name()
            .await?
    } else if args.regional {
        mapper
            .select_by_is_regional_true_and_status_true_order_by_name()
            .await?
    } else if let Some(stock) = args.min_stock {
        mapper
            .select_by_status_true_and_stock_greater_than(stock)
            .await?
    } else {
        mapper.select_by_status_true_order_by_name().await?
    };
    Ok(serde_json::to_value(&products)?)
}

pub async fn set_stock(mapper: &impl ProductMapper, id: i64, stock: i32) -> Result<Value> {
    let mut product = mapper
        .select_by_id(id)
        .await?
        .with_context(|| format!("Product {} not found", id))?;
    product.stock = stock;
    product.on_update();
    let rows = mapper.update_by_id(&product).await?;
    Ok(json!({ "id": id, "stock": stock, "rowsAffected": rows }))
}

pub async fn delete(mapper: &impl ProductMapper, id: i64) -> Result<Value> {
    let rows = mapper.delete_by_id(id).await?;
    Ok(json!({ "id": id, "rowsAffected": rows }))
}

pub async fn exists(mapper: &impl ProductMapper, name: &str) -> Result<Value> {
    let exists = mapper.exists_by_name_and_status_true(name).await?;
    Ok(json!({ "name": name, "exists": exists }))
}

pub async fn check_stock(mapper: &impl ProductMapper, name: &str, quantity: i32) -> Result<Value> {
    let available = mapper.check_stock_availability(name, quantity).await?;
    Ok(json!({ "name": name, "quantity": quantity, "available": available }))
}

pub fn validate_user(args: UserArgs) -> Result<Value> {
    let user = User {
        id: args.id,
        username: args.username,
        phone: args.phone,
        email: args.email,
        nickname: args.nickname,
        ..Default::default()
    };
    let violations = match user.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => errors
            .violations()
            .iter()
            .map(|v| json!({ "field": v.field, "message": v.message }))
            .collect(),
    };
    Ok(json!({ "valid": violations.is_empty(), "violations": violations }))
}
