use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{PaymentType, TransactionStatus, transaction_entity, transaction_item_entity};

pub const DEFAULT_TRANSACTION_TYPE: &str = "onsite";

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionLineRequest {
    pub item_id: i64,
    pub quantity: i32,
    /// 自定义单价，缺省或为负时使用商品售价
    #[serde(alias = "customPrice")]
    pub custom_price: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    pub status: TransactionStatus,
    pub items: Vec<TransactionLineRequest>,
    pub discount: Option<i64>,
    #[serde(alias = "paymentAmount")]
    pub payment_amount: Option<i64>,
    #[serde(alias = "paymentType")]
    pub payment_type: Option<PaymentType>,
    pub note: Option<String>,
    #[serde(alias = "transactionType")]
    pub transaction_type: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTransactionRequest {
    pub status: Option<TransactionStatus>,
    pub note: Option<String>,
    #[serde(alias = "transactionType")]
    pub transaction_type: Option<String>,
    pub discount: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(alias = "paymentAmount")]
    pub payment_amount: i64,
    #[serde(alias = "paymentType")]
    pub payment_type: Option<PaymentType>,
    pub discount: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransactionQuery {
    pub page: Option<u64>,
    #[serde(alias = "limit")]
    pub page_size: Option<u64>,
    /// YYYY-MM-DD
    pub date: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DraftQuery {
    pub status: Option<TransactionStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionLineResponse {
    pub id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub price: i64,
    pub subtotal: i64,
}

impl From<transaction_item_entity::Model> for TransactionLineResponse {
    fn from(m: transaction_item_entity::Model) -> Self {
        Self {
            id: m.id,
            item_id: m.item_id,
            item_name: m.item_name,
            quantity: m.quantity,
            price: m.price,
            subtotal: m.subtotal,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i64,
    pub user_id: Option<i64>,
    pub status: TransactionStatus,
    pub total: i64,
    pub discount: i64,
    pub payment: Option<i64>,
    pub change: Option<i64>,
    pub payment_type: Option<PaymentType>,
    pub note: Option<String>,
    pub transaction_type: String,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<TransactionLineResponse>,
}

impl TransactionResponse {
    pub fn from_parts(
        m: transaction_entity::Model,
        lines: Vec<transaction_item_entity::Model>,
    ) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            status: m.status,
            total: m.total,
            discount: m.discount,
            payment: m.payment,
            change: m.change,
            payment_type: m.payment_type,
            note: m.note,
            transaction_type: m.transaction_type,
            completed_at: m.completed_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            items: lines.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result of a mutation that may carry stock warnings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionOutcome {
    pub transaction: TransactionResponse,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}
