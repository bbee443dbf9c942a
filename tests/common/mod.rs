#![allow(dead_code)]

use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use pos_backend::entities::{Role, item_entity as item, user_entity as user};
use pos_backend::models::TransactionNotice;
use pos_backend::services::{AuditContext, NotificationService, TransactionService};
use pos_backend::utils::StockUnderflowPolicy;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use tokio::sync::mpsc::Receiver;

/// In-memory SQLite with the full schema. One connection, so the database
/// lives as long as the pool.
pub async fn setup_db() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_user(db: &DatabaseConnection, username: &str, password: &str, role: Role) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        username: Set(username.to_string()),
        // 低成本哈希，加快测试
        password_hash: Set(bcrypt::hash(password, 4).expect("hash")),
        role: Set(role),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert user")
}

pub async fn seed_item(
    db: &DatabaseConnection,
    name: &str,
    stock: i32,
    buy_price: i64,
    price: i64,
) -> item::Model {
    let now = Utc::now();
    item::ActiveModel {
        name: Set(name.to_string()),
        description: Set(None),
        stock: Set(stock),
        buy_price: Set(buy_price),
        price: Set(price),
        image_url: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert item")
}

pub fn transaction_service(
    db: &DatabaseConnection,
    policy: StockUnderflowPolicy,
) -> (TransactionService, Receiver<TransactionNotice>) {
    let (notifier, rx) = NotificationService::new(16);
    (TransactionService::new(db.clone(), notifier, policy), rx)
}

pub fn ctx(user_id: i64) -> AuditContext {
    AuditContext::new(Some(user_id), Some("127.0.0.1".to_string()))
}
