use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Serialize;

use crate::entities::{AuditAction, audit_log_entity as audit};
use crate::error::AppResult;
use crate::utils::diff_records;

/// Timestamps change on every write and are not interesting in a diff.
const DIFF_IGNORED_FIELDS: &[&str] = &["created_at", "updated_at"];

/// Who performed a mutation, taken from the authenticated request.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub user_id: Option<i64>,
    pub ip_address: Option<String>,
}

impl AuditContext {
    pub fn new(user_id: Option<i64>, ip_address: Option<String>) -> Self {
        Self {
            user_id,
            ip_address,
        }
    }
}

pub struct AuditRecord<'a, T: Serialize> {
    pub entity_type: &'static str,
    pub entity_id: i64,
    pub action: AuditAction,
    pub old: Option<&'a T>,
    pub new: Option<&'a T>,
    pub description: String,
}

#[derive(Clone)]
pub struct AuditService {
    pool: DatabaseConnection,
}

impl AuditService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Appends one audit row on `conn`, normally the open database transaction
    /// of the mutation being recorded.
    pub async fn record<C, T>(conn: &C, ctx: &AuditContext, rec: AuditRecord<'_, T>) -> AppResult<()>
    where
        C: ConnectionTrait,
        T: Serialize,
    {
        let old_value = rec.old.map(serde_json::to_value).transpose()?;
        let new_value = rec.new.map(serde_json::to_value).transpose()?;
        let changes = match (rec.action, rec.old, rec.new) {
            (AuditAction::Update, Some(old), Some(new)) => {
                diff_records(old, new, DIFF_IGNORED_FIELDS)?
            }
            _ => None,
        };

        audit::ActiveModel {
            entity_type: Set(rec.entity_type.to_string()),
            entity_id: Set(rec.entity_id),
            action: Set(rec.action),
            old_value: Set(old_value),
            new_value: Set(new_value),
            changes: Set(changes),
            user_id: Set(ctx.user_id),
            ip_address: Set(ctx.ip_address.clone()),
            description: Set(rec.description),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(conn)
        .await?;

        Ok(())
    }

    pub async fn entries_for(
        &self,
        entity_type: &str,
        entity_id: i64,
    ) -> AppResult<Vec<audit::Model>> {
        let rows = audit::Entity::find()
            .filter(audit::Column::EntityType.eq(entity_type))
            .filter(audit::Column::EntityId.eq(entity_id))
            .order_by_asc(audit::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(rows)
    }
}
