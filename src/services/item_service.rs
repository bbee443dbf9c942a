use std::collections::HashSet;

use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{AuditAction, item_entity as item};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{AuditContext, AuditRecord, AuditService};
use crate::utils::build_csv;

const ENTITY_TYPE: &str = "item";

#[derive(Clone)]
pub struct ItemService {
    pool: DatabaseConnection,
}

impl ItemService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn list_items(
        &self,
        query: &ItemQuery,
        access: FieldAccess,
    ) -> AppResult<PaginatedResponse<ItemView>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let mut finder = item::Entity::find();
        if let Some(name) = query.name.as_deref() {
            // 每个关键词都必须出现在名称中（不区分大小写）
            for term in name.split_whitespace() {
                let pattern = format!("%{}%", term.to_lowercase());
                finder = finder
                    .filter(Expr::expr(Func::lower(Expr::col(item::Column::Name))).like(pattern));
            }
        }

        let total = finder.clone().count(&self.pool).await?;
        let rows = finder
            .order_by_asc(item::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let data = rows
            .into_iter()
            .map(|m| ItemView::project(m, access))
            .collect();
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn get_item(&self, id: i64) -> AppResult<item::Model> {
        item::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))
    }

    pub async fn create_item(&self, ctx: &AuditContext, req: ItemRequest) -> AppResult<item::Model> {
        let req = normalize_request(req)?;
        let txn = self.pool.begin().await?;

        ensure_name_available(&txn, &req.name, None).await?;
        let created = insert_item(&txn, req).await?;
        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: created.id,
                action: AuditAction::Create,
                old: None,
                new: Some(&created),
                description: format!("Created item '{}'", created.name),
            },
        )
        .await?;

        txn.commit().await?;
        log::info!("Item {} created: {}", created.id, created.name);
        Ok(created)
    }

    pub async fn update_item(
        &self,
        ctx: &AuditContext,
        id: i64,
        req: ItemRequest,
    ) -> AppResult<item::Model> {
        let req = normalize_request(req)?;
        let txn = self.pool.begin().await?;

        let existing = item::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
        ensure_name_available(&txn, &req.name, Some(id)).await?;

        let mut am = existing.clone().into_active_model();
        am.name = Set(req.name);
        am.description = Set(req.description);
        am.stock = Set(req.stock);
        am.buy_price = Set(req.buy_price);
        am.price = Set(req.price);
        am.image_url = Set(req.image_url);
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;

        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: id,
                action: AuditAction::Update,
                old: Some(&existing),
                new: Some(&updated),
                description: format!("Updated item '{}'", updated.name),
            },
        )
        .await?;

        txn.commit().await?;
        Ok(updated)
    }

    pub async fn delete_item(&self, ctx: &AuditContext, id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        let existing = item::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Item not found".to_string()))?;
        item::Entity::delete_by_id(id).exec(&txn).await?;

        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: id,
                action: AuditAction::Delete,
                old: Some(&existing),
                new: None,
                description: format!("Deleted item '{}'", existing.name),
            },
        )
        .await?;

        txn.commit().await?;
        log::info!("Item {id} deleted");
        Ok(())
    }

    /// All-or-nothing: one invalid or duplicate entry rejects the whole batch.
    pub async fn bulk_create_items(
        &self,
        ctx: &AuditContext,
        reqs: Vec<ItemRequest>,
    ) -> AppResult<Vec<item::Model>> {
        if reqs.is_empty() {
            return Err(AppError::ValidationError("No items provided".to_string()));
        }

        let reqs = reqs
            .into_iter()
            .map(normalize_request)
            .collect::<AppResult<Vec<_>>>()?;
        let mut seen = HashSet::new();
        for req in &reqs {
            if !seen.insert(req.name.as_str()) {
                return Err(AppError::ValidationError(format!(
                    "Duplicate item name in batch: {}",
                    req.name
                )));
            }
        }

        let txn = self.pool.begin().await?;
        let mut created = Vec::with_capacity(reqs.len());
        for req in reqs {
            ensure_name_available(&txn, &req.name, None).await?;
            let model = insert_item(&txn, req).await?;
            AuditService::record(
                &txn,
                ctx,
                AuditRecord {
                    entity_type: ENTITY_TYPE,
                    entity_id: model.id,
                    action: AuditAction::Create,
                    old: None,
                    new: Some(&model),
                    description: format!("Bulk created item '{}'", model.name),
                },
            )
            .await?;
            created.push(model);
        }
        txn.commit().await?;

        log::info!("Bulk created {} items", created.len());
        Ok(created)
    }

    pub async fn export_csv(&self, access: FieldAccess) -> AppResult<String> {
        let rows = item::Entity::find()
            .order_by_asc(item::Column::Id)
            .all(&self.pool)
            .await?;
        let rows: Vec<Vec<String>> = rows.iter().map(|m| access.csv_row(m)).collect();
        Ok(build_csv(access.csv_headers(), &rows))
    }
}

fn normalize_request(mut req: ItemRequest) -> AppResult<ItemRequest> {
    req.name = req.name.trim().to_string();
    if req.name.is_empty() {
        return Err(AppError::ValidationError("Item name is required".to_string()));
    }
    if req.price < 0 || req.buy_price < 0 {
        return Err(AppError::ValidationError(format!(
            "Prices of item '{}' must not be negative",
            req.name
        )));
    }
    req.description = req.description.filter(|s| !s.trim().is_empty());
    req.image_url = req.image_url.filter(|s| !s.trim().is_empty());
    Ok(req)
}

async fn ensure_name_available<C: ConnectionTrait>(
    conn: &C,
    name: &str,
    exclude_id: Option<i64>,
) -> AppResult<()> {
    let mut finder = item::Entity::find().filter(item::Column::Name.eq(name));
    if let Some(id) = exclude_id {
        finder = finder.filter(item::Column::Id.ne(id));
    }
    if finder.count(conn).await? > 0 {
        return Err(AppError::ValidationError(format!(
            "Item name already exists: {name}"
        )));
    }
    Ok(())
}

async fn insert_item<C: ConnectionTrait>(conn: &C, req: ItemRequest) -> AppResult<item::Model> {
    let now = Utc::now();
    let model = item::ActiveModel {
        name: Set(req.name),
        description: Set(req.description),
        stock: Set(req.stock),
        buy_price: Set(req.buy_price),
        price: Set(req.price),
        image_url: Set(req.image_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(model)
}
