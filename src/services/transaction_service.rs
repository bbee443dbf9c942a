use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    AuditAction, PaymentType, TransactionStatus, item_entity as item,
    transaction_entity as trx, transaction_item_entity as trx_item,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{AuditContext, AuditRecord, AuditService, NotificationService};
use crate::utils::{
    PricedLine, StockUnderflowPolicy, day_bounds, final_total, normalize_discount, parse_date,
    price_line, settle_payment,
};

const ENTITY_TYPE: &str = "transaction";

#[derive(Clone)]
pub struct TransactionService {
    pool: DatabaseConnection,
    notifier: NotificationService,
    stock_policy: StockUnderflowPolicy,
}

impl TransactionService {
    pub fn new(
        pool: DatabaseConnection,
        notifier: NotificationService,
        stock_policy: StockUnderflowPolicy,
    ) -> Self {
        Self {
            pool,
            notifier,
            stock_policy,
        }
    }

    pub async fn create_transaction(
        &self,
        ctx: &AuditContext,
        req: CreateTransactionRequest,
    ) -> AppResult<TransactionOutcome> {
        if req.items.is_empty() {
            return Err(AppError::ValidationError(
                "Transaction must contain at least one item".to_string(),
            ));
        }
        if req.status == TransactionStatus::Refunded {
            return Err(AppError::ValidationError(
                "Status must be draft or completed".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        let item_ids: Vec<i64> = req.items.iter().map(|l| l.item_id).collect();
        let mut catalog = load_items(&txn, &item_ids).await?;

        let mut priced = Vec::with_capacity(req.items.len());
        for line in &req.items {
            let it = catalog.get(&line.item_id).ok_or_else(|| {
                AppError::ValidationError(format!("Item {} not found", line.item_id))
            })?;
            priced.push(price_line(
                it.id,
                &it.name,
                line.quantity,
                it.price,
                line.custom_price,
            )?);
        }

        let discount = normalize_discount(req.discount);
        let total = final_total(priced.iter().map(|l| l.subtotal), discount)?;
        let completing = req.status == TransactionStatus::Completed;

        let (payment, change, payment_type, completed_at) = if completing {
            let change = settle_payment(total, req.payment_amount)?;
            (
                req.payment_amount,
                Some(change),
                Some(req.payment_type.unwrap_or(PaymentType::Cash)),
                Some(Utc::now()),
            )
        } else {
            (None, None, req.payment_type, None)
        };

        let now = Utc::now();
        let header = trx::ActiveModel {
            user_id: Set(ctx.user_id),
            status: Set(req.status),
            total: Set(total),
            discount: Set(discount),
            payment: Set(payment),
            change: Set(change),
            payment_type: Set(payment_type),
            note: Set(req.note.filter(|n| !n.trim().is_empty())),
            transaction_type: Set(req
                .transaction_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TRANSACTION_TYPE.to_string())),
            completed_at: Set(completed_at),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let lines = insert_lines(&txn, header.id, &priced).await?;
        let warnings = if completing {
            self.decrement_stock(&txn, &mut catalog, &priced).await?
        } else {
            Vec::new()
        };

        let response = TransactionResponse::from_parts(header, lines);
        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: response.id,
                action: AuditAction::Create,
                old: None,
                new: Some(&response),
                description: format!("Created {} transaction #{}", response.status, response.id),
            },
        )
        .await?;

        txn.commit().await?;
        log::info!(
            "Transaction {} created with status {}, total {}",
            response.id,
            response.status,
            response.total
        );

        if completing {
            self.send_notice(&response);
        }
        Ok(TransactionOutcome {
            transaction: response,
            warnings,
        })
    }

    /// Edits a draft. Completion goes through [`Self::checkout`].
    pub async fn update_transaction(
        &self,
        ctx: &AuditContext,
        id: i64,
        req: UpdateTransactionRequest,
    ) -> AppResult<TransactionResponse> {
        if let Some(status) = req.status
            && status != TransactionStatus::Draft
        {
            return Err(AppError::ValidationError(
                "Status can only be set to draft; use checkout to complete".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        let existing = find_transaction(&txn, id).await?;
        if existing.status != TransactionStatus::Draft {
            return Err(AppError::ValidationError(
                "Only draft transactions can be updated".to_string(),
            ));
        }
        let lines = load_lines(&txn, id).await?;
        let before = TransactionResponse::from_parts(existing.clone(), lines.clone());

        let mut am = existing.clone().into_active_model();
        if let Some(note) = req.note {
            am.note = Set(Some(note).filter(|n| !n.trim().is_empty()));
        }
        if let Some(kind) = req.transaction_type.filter(|t| !t.trim().is_empty()) {
            am.transaction_type = Set(kind);
        }
        if req.discount.is_some() {
            let discount = normalize_discount(req.discount);
            am.discount = Set(discount);
            am.total = Set(final_total(lines.iter().map(|l| l.subtotal), discount)?);
        }
        am.updated_at = Set(Utc::now());
        let updated = am.update(&txn).await?;

        let after = TransactionResponse::from_parts(updated, lines);
        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: id,
                action: AuditAction::Update,
                old: Some(&before),
                new: Some(&after),
                description: format!("Updated draft transaction #{id}"),
            },
        )
        .await?;

        txn.commit().await?;
        Ok(after)
    }

    pub async fn checkout(
        &self,
        ctx: &AuditContext,
        id: i64,
        req: CheckoutRequest,
    ) -> AppResult<TransactionOutcome> {
        let txn = self.pool.begin().await?;
        let existing = find_transaction(&txn, id).await?;
        if existing.status != TransactionStatus::Draft {
            return Err(AppError::ValidationError(
                "Only draft transactions can be checked out".to_string(),
            ));
        }
        let lines = load_lines(&txn, id).await?;
        if lines.is_empty() {
            return Err(AppError::ValidationError(
                "Transaction has no items".to_string(),
            ));
        }

        let discount = match req.discount {
            Some(_) => normalize_discount(req.discount),
            None => existing.discount,
        };
        let total = final_total(lines.iter().map(|l| l.subtotal), discount)?;
        let change = settle_payment(total, Some(req.payment_amount))?;

        let item_ids: Vec<i64> = lines.iter().map(|l| l.item_id).collect();
        let mut catalog = load_items(&txn, &item_ids).await?;
        let mut priced = Vec::with_capacity(lines.len());
        for l in &lines {
            if !catalog.contains_key(&l.item_id) {
                return Err(AppError::ValidationError(format!(
                    "Item '{}' no longer exists",
                    l.item_name
                )));
            }
            priced.push(PricedLine {
                item_id: l.item_id,
                item_name: l.item_name.clone(),
                quantity: l.quantity,
                unit_price: l.price,
                subtotal: l.subtotal,
            });
        }
        let warnings = self.decrement_stock(&txn, &mut catalog, &priced).await?;

        let before = TransactionResponse::from_parts(existing.clone(), lines.clone());
        let now = Utc::now();
        let mut am = existing.into_active_model();
        am.status = Set(TransactionStatus::Completed);
        am.discount = Set(discount);
        am.total = Set(total);
        am.payment = Set(Some(req.payment_amount));
        am.change = Set(Some(change));
        am.payment_type = Set(Some(req.payment_type.unwrap_or(PaymentType::Cash)));
        am.completed_at = Set(Some(now));
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        let after = TransactionResponse::from_parts(updated, lines);
        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: id,
                action: AuditAction::Checkout,
                old: Some(&before),
                new: Some(&after),
                description: format!("Checked out transaction #{id}, total {total}"),
            },
        )
        .await?;

        txn.commit().await?;
        log::info!("Transaction {id} checked out, total {total}, change {change}");

        self.send_notice(&after);
        Ok(TransactionOutcome {
            transaction: after,
            warnings,
        })
    }

    /// Puts sold quantities back on the shelf. Items deleted since the sale are skipped.
    pub async fn refund(&self, ctx: &AuditContext, id: i64) -> AppResult<TransactionResponse> {
        let txn = self.pool.begin().await?;
        let existing = find_transaction(&txn, id).await?;
        if existing.status != TransactionStatus::Completed {
            return Err(AppError::ValidationError(
                "Only completed transactions can be refunded".to_string(),
            ));
        }
        let lines = load_lines(&txn, id).await?;

        let item_ids: Vec<i64> = lines.iter().map(|l| l.item_id).collect();
        let mut catalog = load_items(&txn, &item_ids).await?;
        for l in &lines {
            match catalog.get_mut(&l.item_id) {
                Some(it) => {
                    it.stock = it.stock.checked_add(l.quantity).ok_or_else(|| {
                        AppError::ValidationError(format!(
                            "Stock of item '{}' would overflow",
                            it.name
                        ))
                    })?;
                }
                None => log::warn!(
                    "Refund of transaction {id}: item {} no longer exists, stock not restored",
                    l.item_id
                ),
            }
        }
        let now = Utc::now();
        for it in catalog.into_values() {
            let stock = it.stock;
            let mut am = it.into_active_model();
            am.stock = Set(stock);
            am.updated_at = Set(now);
            am.update(&txn).await?;
        }

        let before = TransactionResponse::from_parts(existing.clone(), lines.clone());
        let mut am = existing.into_active_model();
        am.status = Set(TransactionStatus::Refunded);
        am.payment = Set(None);
        am.change = Set(None);
        am.updated_at = Set(now);
        let updated = am.update(&txn).await?;

        let after = TransactionResponse::from_parts(updated, lines);
        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: id,
                action: AuditAction::Refund,
                old: Some(&before),
                new: Some(&after),
                description: format!("Refunded transaction #{id}"),
            },
        )
        .await?;

        txn.commit().await?;
        log::info!("Transaction {id} refunded");
        Ok(after)
    }

    pub async fn delete_transaction(&self, ctx: &AuditContext, id: i64) -> AppResult<()> {
        let txn = self.pool.begin().await?;
        let existing = find_transaction(&txn, id).await?;
        if existing.status != TransactionStatus::Draft {
            return Err(AppError::ValidationError(
                "Only draft transactions can be deleted".to_string(),
            ));
        }
        let lines = load_lines(&txn, id).await?;
        let before = TransactionResponse::from_parts(existing, lines);

        trx_item::Entity::delete_many()
            .filter(trx_item::Column::TransactionId.eq(id))
            .exec(&txn)
            .await?;
        trx::Entity::delete_by_id(id).exec(&txn).await?;

        AuditService::record(
            &txn,
            ctx,
            AuditRecord {
                entity_type: ENTITY_TYPE,
                entity_id: id,
                action: AuditAction::Delete,
                old: Some(&before),
                new: None,
                description: format!("Deleted draft transaction #{id}"),
            },
        )
        .await?;

        txn.commit().await?;
        log::info!("Draft transaction {id} deleted");
        Ok(())
    }

    pub async fn get_transaction(&self, id: i64) -> AppResult<TransactionResponse> {
        let header = find_transaction(&self.pool, id).await?;
        let lines = load_lines(&self.pool, id).await?;
        Ok(TransactionResponse::from_parts(header, lines))
    }

    pub async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<PaginatedResponse<TransactionResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let mut finder = trx::Entity::find();
        if let Some(raw) = query.date.as_deref().filter(|d| !d.trim().is_empty()) {
            let (start, end) = day_bounds(parse_date(raw)?);
            finder = finder
                .filter(trx::Column::CreatedAt.gte(start))
                .filter(trx::Column::CreatedAt.lt(end));
        }
        self.paginate(finder, &params).await
    }

    /// Completed and refunded transactions only.
    pub async fn history(
        &self,
        query: &TransactionQuery,
    ) -> AppResult<PaginatedResponse<TransactionResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);
        let finder = trx::Entity::find().filter(
            trx::Column::Status.is_in([TransactionStatus::Completed, TransactionStatus::Refunded]),
        );
        self.paginate(finder, &params).await
    }

    pub async fn drafts(&self, query: &DraftQuery) -> AppResult<Vec<TransactionResponse>> {
        let status = query.status.unwrap_or(TransactionStatus::Draft);
        let headers = trx::Entity::find()
            .filter(trx::Column::Status.eq(status))
            .order_by_desc(trx::Column::CreatedAt)
            .order_by_desc(trx::Column::Id)
            .all(&self.pool)
            .await?;
        with_lines(&self.pool, headers).await
    }

    async fn paginate(
        &self,
        finder: sea_orm::Select<trx::Entity>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<TransactionResponse>> {
        let total = finder.clone().count(&self.pool).await?;
        let headers = finder
            .order_by_desc(trx::Column::CreatedAt)
            .order_by_desc(trx::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;
        let data = with_lines(&self.pool, headers).await?;
        Ok(PaginatedResponse::new(data, params, total))
    }

    /// Applies the configured underflow policy line by line and persists the new stock.
    async fn decrement_stock<C: ConnectionTrait>(
        &self,
        conn: &C,
        catalog: &mut HashMap<i64, item::Model>,
        lines: &[PricedLine],
    ) -> AppResult<Vec<String>> {
        let mut warnings = Vec::new();
        for line in lines {
            let Some(it) = catalog.get_mut(&line.item_id) else {
                continue;
            };
            let outcome = self
                .stock_policy
                .decrement(&it.name, it.stock, line.quantity)?;
            if let Some(w) = outcome.warning {
                log::warn!("{w}");
                warnings.push(w);
            }
            it.stock = outcome.new_stock;
        }

        let now = Utc::now();
        let touched: Vec<i64> = lines.iter().map(|l| l.item_id).collect();
        for (id, it) in catalog.iter() {
            if !touched.contains(id) {
                continue;
            }
            let mut am = it.clone().into_active_model();
            am.stock = Set(it.stock);
            am.updated_at = Set(now);
            am.update(conn).await?;
        }
        Ok(warnings)
    }

    fn send_notice(&self, response: &TransactionResponse) {
        let notice = TransactionNotice {
            transaction_id: response.id,
            status: response.status,
            total: response.total,
            lines: response
                .items
                .iter()
                .map(|l| NoticeLine {
                    item_name: l.item_name.clone(),
                    quantity: l.quantity,
                    subtotal: l.subtotal,
                })
                .collect(),
            completed_at: response.completed_at.unwrap_or_else(Utc::now),
        };
        self.notifier.notify(notice);
    }
}

async fn find_transaction<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<trx::Model> {
    trx::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    ids: &[i64],
) -> AppResult<HashMap<i64, item::Model>> {
    let rows = item::Entity::find()
        .filter(item::Column::Id.is_in(ids.to_vec()))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|m| (m.id, m)).collect())
}

async fn load_lines<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<Vec<trx_item::Model>> {
    let rows = trx_item::Entity::find()
        .filter(trx_item::Column::TransactionId.eq(id))
        .order_by_asc(trx_item::Column::Id)
        .all(conn)
        .await?;
    Ok(rows)
}

/// Attaches lines to a page of headers with one query.
pub(crate) async fn with_lines<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<trx::Model>,
) -> AppResult<Vec<TransactionResponse>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<i64> = headers.iter().map(|h| h.id).collect();
    let rows = trx_item::Entity::find()
        .filter(trx_item::Column::TransactionId.is_in(ids))
        .order_by_asc(trx_item::Column::Id)
        .all(conn)
        .await?;

    let mut grouped: HashMap<i64, Vec<trx_item::Model>> = HashMap::new();
    for row in rows {
        grouped.entry(row.transaction_id).or_default().push(row);
    }
    Ok(headers
        .into_iter()
        .map(|h| {
            let lines = grouped.remove(&h.id).unwrap_or_default();
            TransactionResponse::from_parts(h, lines)
        })
        .collect())
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    transaction_id: i64,
    priced: &[PricedLine],
) -> AppResult<Vec<trx_item::Model>> {
    let mut lines = Vec::with_capacity(priced.len());
    for p in priced {
        let line = trx_item::ActiveModel {
            transaction_id: Set(transaction_id),
            item_id: Set(p.item_id),
            item_name: Set(p.item_name.clone()),
            quantity: Set(p.quantity),
            price: Set(p.unit_price),
            subtotal: Set(p.subtotal),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        lines.push(line);
    }
    Ok(lines)
}
