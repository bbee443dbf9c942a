use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::transaction::TransactionResponse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TopItem {
    pub item_id: i64,
    pub name: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub total_items: u64,
    pub total_transactions: u64,
    pub draft_transactions: u64,
    pub completed_transactions: u64,
    pub refunded_transactions: u64,
    /// 已完成交易的明细小计之和
    pub total_revenue: i64,
    pub total_profit: i64,
    pub today_profit: i64,
    pub low_stock_items: u64,
    pub recent_transactions: Vec<TransactionResponse>,
    pub top_selling_items: Vec<TopItem>,
}
