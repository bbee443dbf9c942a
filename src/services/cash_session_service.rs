use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entities::{
    CashSessionStatus, PaymentType, TransactionStatus, cash_session_entity as session,
    transaction_entity as trx,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::{CashTally, day_bounds, parse_date, reconcile};

#[derive(Clone)]
pub struct CashSessionService {
    pool: DatabaseConnection,
}

impl CashSessionService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn open_session(
        &self,
        user_id: i64,
        req: OpenCashSessionRequest,
    ) -> AppResult<CashSessionResponse> {
        if req.opening_cash < 0 {
            return Err(AppError::ValidationError(
                "Opening cash must not be negative".to_string(),
            ));
        }

        let existing = session::Entity::find()
            .filter(session::Column::UserId.eq(user_id))
            .filter(session::Column::Status.eq(CashSessionStatus::Open))
            .count(&self.pool)
            .await?;
        if existing > 0 {
            return Err(AppError::ValidationError(
                "You already have an open cash session".to_string(),
            ));
        }

        let now = Utc::now();
        let created = session::ActiveModel {
            user_id: Set(user_id),
            opening_cash: Set(req.opening_cash),
            opened_at: Set(now),
            status: Set(CashSessionStatus::Open),
            closing_cash: Set(None),
            closed_at: Set(None),
            expected_cash: Set(0),
            total_cash_in: Set(0),
            total_change: Set(0),
            difference: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Cash session {} opened by user {user_id} with {}",
            created.id,
            created.opening_cash
        );
        Ok(created.into())
    }

    pub async fn current_session(&self, user_id: i64) -> AppResult<CashSessionResponse> {
        session::Entity::find()
            .filter(session::Column::UserId.eq(user_id))
            .filter(session::Column::Status.eq(CashSessionStatus::Open))
            .order_by_desc(session::Column::OpenedAt)
            .one(&self.pool)
            .await?
            .map(Into::into)
            .ok_or_else(|| AppError::NotFound("No open cash session".to_string()))
    }

    /// Reconciles the drawer against completed cash sales created since the session opened.
    pub async fn close_session(
        &self,
        user_id: i64,
        req: CloseCashSessionRequest,
    ) -> AppResult<CashSessionResponse> {
        if req.closing_cash < 0 {
            return Err(AppError::ValidationError(
                "Closing cash must not be negative".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        let open = session::Entity::find()
            .filter(session::Column::UserId.eq(user_id))
            .filter(session::Column::Status.eq(CashSessionStatus::Open))
            .order_by_desc(session::Column::OpenedAt)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::ValidationError("No open cash session".to_string()))?;

        let now = Utc::now();
        let payments: Vec<(Option<i64>, Option<i64>)> = trx::Entity::find()
            .select_only()
            .column(trx::Column::Payment)
            .column(trx::Column::Change)
            .filter(trx::Column::Status.eq(TransactionStatus::Completed))
            .filter(trx::Column::PaymentType.eq(PaymentType::Cash))
            .filter(trx::Column::CreatedAt.between(open.opened_at, now))
            .into_tuple()
            .all(&txn)
            .await?;
        let tally = CashTally::from_payments(payments)?;
        let result = reconcile(open.opening_cash, tally, req.closing_cash)?;

        let session_id = open.id;
        let mut am = open.into_active_model();
        am.status = Set(CashSessionStatus::Closed);
        am.closing_cash = Set(Some(req.closing_cash));
        am.closed_at = Set(Some(now));
        am.total_cash_in = Set(tally.total_cash_in);
        am.total_change = Set(tally.total_change);
        am.expected_cash = Set(result.expected_cash);
        am.difference = Set(Some(result.difference));
        am.updated_at = Set(now);
        let closed = am.update(&txn).await?;
        txn.commit().await?;

        if result.difference != 0 {
            log::warn!(
                "Cash session {session_id} closed with difference {} (expected {}, declared {})",
                result.difference,
                result.expected_cash,
                req.closing_cash
            );
        } else {
            log::info!("Cash session {session_id} closed balanced");
        }
        Ok(closed.into())
    }

    pub async fn history(
        &self,
        user_id: i64,
        query: &CashSessionQuery,
    ) -> AppResult<PaginatedResponse<CashSessionResponse>> {
        let params = PaginationParams::new(query.page, query.page_size);

        let mut finder = session::Entity::find().filter(session::Column::UserId.eq(user_id));
        if let Some(raw) = query.start_date.as_deref().filter(|d| !d.trim().is_empty()) {
            let (start, _) = day_bounds(parse_date(raw)?);
            finder = finder.filter(session::Column::OpenedAt.gte(start));
        }
        if let Some(raw) = query.end_date.as_deref().filter(|d| !d.trim().is_empty()) {
            let (_, end) = day_bounds(parse_date(raw)?);
            finder = finder.filter(session::Column::OpenedAt.lt(end));
        }

        let total = finder.clone().count(&self.pool).await?;
        let rows = finder
            .order_by_desc(session::Column::OpenedAt)
            .order_by_desc(session::Column::Id)
            .limit(params.get_limit())
            .offset(params.get_offset())
            .all(&self.pool)
            .await?;

        let data = rows.into_iter().map(Into::into).collect();
        Ok(PaginatedResponse::new(data, &params, total))
    }
}
