use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{AttendanceStatus, attendance_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAttendanceRequest {
    pub user_id: i64,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceQuery {
    pub page: Option<u64>,
    #[serde(alias = "limit")]
    pub page_size: Option<u64>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceResponse {
    pub id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AttendanceResponse {
    pub fn with_username(m: attendance_entity::Model, username: Option<String>) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            username,
            date: m.date,
            status: m.status,
            note: m.note,
            created_at: m.created_at,
        }
    }
}
