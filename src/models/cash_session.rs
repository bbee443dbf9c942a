use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{CashSessionStatus, cash_session_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OpenCashSessionRequest {
    #[schema(example = 100000)]
    pub opening_cash: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CloseCashSessionRequest {
    #[schema(example = 150000)]
    pub closing_cash: i64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CashSessionQuery {
    pub page: Option<u64>,
    #[serde(alias = "limit")]
    pub page_size: Option<u64>,
    /// YYYY-MM-DD，按开班日期（含当天）
    pub start_date: Option<String>,
    /// YYYY-MM-DD，按开班日期（含当天）
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CashSessionResponse {
    pub id: i64,
    pub user_id: i64,
    pub opening_cash: i64,
    pub opened_at: DateTime<Utc>,
    pub status: CashSessionStatus,
    pub closing_cash: Option<i64>,
    pub closed_at: Option<DateTime<Utc>>,
    pub expected_cash: i64,
    pub total_cash_in: i64,
    pub total_change: i64,
    pub difference: Option<i64>,
}

impl From<cash_session_entity::Model> for CashSessionResponse {
    fn from(m: cash_session_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            opening_cash: m.opening_cash,
            opened_at: m.opened_at,
            status: m.status,
            closing_cash: m.closing_cash,
            closed_at: m.closed_at,
            expected_cash: m.expected_cash,
            total_cash_in: m.total_cash_in,
            total_change: m.total_change,
            difference: m.difference,
        }
    }
}
