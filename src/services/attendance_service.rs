use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::{attendance_entity as attendance, user_entity as user};
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct AttendanceService {
    pool: DatabaseConnection,
}

impl AttendanceService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 记录今日考勤，每个用户每天仅允许一条
    pub async fn create_attendance(
        &self,
        req: CreateAttendanceRequest,
    ) -> AppResult<AttendanceResponse> {
        let member = user::Entity::find_by_id(req.user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let today = Utc::now().date_naive();
        let exists = attendance::Entity::find()
            .filter(attendance::Column::UserId.eq(req.user_id))
            .filter(attendance::Column::Date.eq(today))
            .count(&self.pool)
            .await?;
        if exists > 0 {
            return Err(AppError::ValidationError(
                "Attendance for this user has already been recorded today".to_string(),
            ));
        }

        let created = attendance::ActiveModel {
            user_id: Set(req.user_id),
            date: Set(today),
            status: Set(req.status),
            note: Set(req.note.filter(|n| !n.trim().is_empty())),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Attendance recorded for user {} on {today}: {:?}",
            member.id,
            created.status
        );
        Ok(AttendanceResponse::with_username(created, Some(member.username)))
    }

    pub async fn list_all(&self) -> AppResult<Vec<AttendanceResponse>> {
        let rows = attendance::Entity::find()
            .order_by_desc(attendance::Column::Date)
            .order_by_desc(attendance::Column::Id)
            .all(&self.pool)
            .await?;
        self.attach_usernames(rows).await
    }

    pub async fn today(&self) -> AppResult<Vec<AttendanceResponse>> {
        let rows = attendance::Entity::find()
            .filter(attendance::Column::Date.eq(Utc::now().date_naive()))
            .order_by_asc(attendance::Column::Id)
            .all(&self.pool)
            .await?;
        self.attach_usernames(rows).await
    }

    pub async fn history(
        &self,
        query: &AttendanceQuery,
    ) -> AppResult<PaginatedResponse<AttendanceResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut finder = attendance::Entity::find();
        if let Some(user_id) = query.user_id {
            finder = finder.filter(attendance::Column::UserId.eq(user_id));
        }

        let total = finder.clone().count(&self.pool).await?;
        let rows = finder
            .order_by_desc(attendance::Column::Date)
            .order_by_desc(attendance::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;
        let data = self.attach_usernames(rows).await?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    async fn attach_usernames(
        &self,
        rows: Vec<attendance::Model>,
    ) -> AppResult<Vec<AttendanceResponse>> {
        let ids: Vec<i64> = rows.iter().map(|r| r.user_id).collect();
        let names: HashMap<i64, String> = if ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|u| (u.id, u.username))
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|r| {
                let username = names.get(&r.user_id).cloned();
                AttendanceResponse::with_username(r, username)
            })
            .collect())
    }
}
