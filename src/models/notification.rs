use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entities::TransactionStatus;

#[derive(Debug, Clone, Serialize)]
pub struct NoticeLine {
    pub item_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

/// Pushed to the notification worker after a sale is committed.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionNotice {
    pub transaction_id: i64,
    pub status: TransactionStatus,
    pub total: i64,
    pub lines: Vec<NoticeLine>,
    pub completed_at: DateTime<Utc>,
}
