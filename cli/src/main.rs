mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orderstore::{DbConfig, DbDriver, DbPool, SqlProductMapper};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orderstore-cli")]
#[command(about = "Manage the product catalog of the order service")]
#[command(version)]
struct Args {
    /// Database URL (e.g., sqlite://orders.db?mode=rwc); falls back to DATABASE_URL
    #[arg(short, long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the CREATE TABLE statements for the target database
    Schema,
    /// Create the products table if it does not exist
    Init,
    /// Validate and insert a product
    Add(commands::AddArgs),
    /// Look up a single product by id or by name
    Get(commands::GetArgs),
    /// List active products
    List(commands::ListArgs),
    /// Update the stock of a product
    SetStock {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        stock: i32,
    },
    /// Delete a product by id
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Check whether an active product with this name exists
    Exists {
        #[arg(long)]
        name: String,
    },
    /// Check whether an active product has at least QUANTITY in stock
    CheckStock {
        #[arg(long)]
        name: String,
        #[arg(long)]
        quantity: i32,
    },
    /// Validate a user without storing it
    ValidateUser(commands::UserArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(database_url: Option<String>) -> Result<DbConfig> {
    match database_url {
        Some(url) => {
            // 命令行指定 URL 时，其余连接池参数仍从环境变量读取
            let config = DbConfig::from_lookup(|key| {
                if key == "DATABASE_URL" {
                    Some(url.clone())
                } else {
                    std::env::var(key).ok()
                }
            })?;
            Ok(config)
        }
        None => DbConfig::from_env().context("DATABASE_URL is required (flag or environment)"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = load_config(args.database_url)?;

    // 打印建表语句不需要连接数据库
    if let Command::Schema = args.command {
        let driver = DbDriver::from_url(&config.url)?;
        for statement in orderstore::schema::products_ddl(driver) {
            println!("{};\n", statement);
        }
        return Ok(());
    }

    let pool = DbPool::connect_with(&config)
        .await
        .context("Failed to connect to database")?;
    let mapper = SqlProductMapper::new(pool.clone());

    let output = match args.command {
        Command::Schema => unreachable!("handled before connecting"),
        Command::Init => {
            orderstore::create_products_table(&pool).await?;
            serde_json::json!({ "initialized": true })
        }
        Command::Add(add) => commands::add(&mapper, add).await?,
        Command::Get(get) => commands::get(&mapper, get).await?,
        Command::List(list) => commands::list(&mapper, list).await?,
        Command::SetStock { id, stock } => commands::set_stock(&mapper, id, stock).await?,
        Command::Delete { id } => commands::delete(&mapper, id).await?,
        Command::Exists { name } => commands::exists(&mapper, &name).await?,
        Command::CheckStock { name, quantity } => {
            commands::check_stock(&mapper, &name, quantity).await?
        }
        Command::ValidateUser(user) => commands::validate_user(user)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_filters() {
        let args = Args::parse_from([
            "orderstore-cli",
            "--database-url",
            "sqlite::memory:",
            "list",
            "--search",
            "ea",
        ]);
        match args.command {
            Command::List(list) => assert_eq!(list.search.as_deref(), Some("ea")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_list_filters_are_exclusive() {
        let result = Args::try_parse_from(["orderstore-cli", "list", "--seasonal", "--regional"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_flag_url_wins() {
        let config = load_config(Some("sqlite::memory:".to_string())).unwrap();
        assert_eq!(config.url, "sqlite::memory:");
    }
}
