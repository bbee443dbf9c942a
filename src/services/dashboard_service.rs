use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::entities::{
    TransactionStatus, item_entity as item, transaction_entity as trx,
    transaction_item_entity as trx_item,
};
use crate::error::AppResult;
use crate::models::*;
use crate::services::transaction_service::with_lines;

pub const LOW_STOCK_THRESHOLD: i32 = 5;
const RECENT_TRANSACTIONS: u64 = 3;
const TOP_SELLERS: usize = 5;

/// One sold line of a completed transaction, joined with the item's current buy price.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
    /// `None` when the item has since been deleted.
    pub buy_price: Option<i64>,
    /// Day the transaction was created, in UTC.
    pub sold_on: NaiveDate,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SalesSummary {
    pub revenue: i64,
    pub profit: i64,
    pub today_profit: i64,
}

pub fn summarize_sales(lines: &[SaleLine], today: NaiveDate) -> SalesSummary {
    lines.iter().fold(SalesSummary::default(), |mut acc, l| {
        acc.revenue += l.subtotal;
        if let Some(buy) = l.buy_price {
            let profit = i64::from(l.quantity) * (l.unit_price - buy);
            acc.profit += profit;
            if l.sold_on == today {
                acc.today_profit += profit;
            }
        }
        acc
    })
}

/// Highest cumulative quantity first; ties go to the lower item id.
pub fn top_sellers(lines: &[SaleLine], limit: usize) -> Vec<TopItem> {
    let mut totals: HashMap<i64, TopItem> = HashMap::new();
    for l in lines {
        totals
            .entry(l.item_id)
            .or_insert_with(|| TopItem {
                item_id: l.item_id,
                name: l.item_name.clone(),
                quantity: 0,
            })
            .quantity += i64::from(l.quantity);
    }

    let mut ranked: Vec<TopItem> = totals.into_values().collect();
    ranked.sort_by(|a, b| b.quantity.cmp(&a.quantity).then(a.item_id.cmp(&b.item_id)));
    ranked.truncate(limit);
    ranked
}

#[derive(Clone)]
pub struct DashboardService {
    pool: DatabaseConnection,
}

impl DashboardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn summary(&self) -> AppResult<DashboardResponse> {
        let total_items = item::Entity::find().count(&self.pool).await?;
        let total_transactions = trx::Entity::find().count(&self.pool).await?;
        let draft_transactions = self.count_status(TransactionStatus::Draft).await?;
        let completed_transactions = self.count_status(TransactionStatus::Completed).await?;
        let refunded_transactions = self.count_status(TransactionStatus::Refunded).await?;
        let low_stock_items = item::Entity::find()
            .filter(item::Column::Stock.lt(LOW_STOCK_THRESHOLD))
            .count(&self.pool)
            .await?;

        let sales = self.completed_sale_lines().await?;
        let summary = summarize_sales(&sales, Utc::now().date_naive());

        let recent = trx::Entity::find()
            .order_by_desc(trx::Column::CreatedAt)
            .order_by_desc(trx::Column::Id)
            .limit(RECENT_TRANSACTIONS)
            .all(&self.pool)
            .await?;
        let recent_transactions = with_lines(&self.pool, recent).await?;

        Ok(DashboardResponse {
            total_items,
            total_transactions,
            draft_transactions,
            completed_transactions,
            refunded_transactions,
            total_revenue: summary.revenue,
            total_profit: summary.profit,
            today_profit: summary.today_profit,
            low_stock_items,
            recent_transactions,
            top_selling_items: top_sellers(&sales, TOP_SELLERS),
        })
    }

    async fn count_status(&self, status: TransactionStatus) -> AppResult<u64> {
        let n = trx::Entity::find()
            .filter(trx::Column::Status.eq(status))
            .count(&self.pool)
            .await?;
        Ok(n)
    }

    async fn completed_sale_lines(&self) -> AppResult<Vec<SaleLine>> {
        let completed: HashMap<i64, NaiveDate> = trx::Entity::find()
            .filter(trx::Column::Status.eq(TransactionStatus::Completed))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|t| (t.id, t.created_at.date_naive()))
            .collect();
        if completed.is_empty() {
            return Ok(Vec::new());
        }

        let lines = trx_item::Entity::find()
            .filter(trx_item::Column::TransactionId.is_in(completed.keys().copied()))
            .all(&self.pool)
            .await?;

        let item_ids: Vec<i64> = lines.iter().map(|l| l.item_id).collect();
        let buy_prices: HashMap<i64, i64> = item::Entity::find()
            .filter(item::Column::Id.is_in(item_ids))
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|m| (m.id, m.buy_price))
            .collect();

        Ok(lines
            .into_iter()
            .filter_map(|l| {
                let sold_on = completed.get(&l.transaction_id).copied()?;
                Some(SaleLine {
                    buy_price: buy_prices.get(&l.item_id).copied(),
                    sold_on,
                    item_id: l.item_id,
                    item_name: l.item_name,
                    quantity: l.quantity,
                    unit_price: l.price,
                    subtotal: l.subtotal,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(item_id: i64, qty: i32, price: i64, buy: Option<i64>, on: NaiveDate) -> SaleLine {
        SaleLine {
            item_id,
            item_name: format!("item-{item_id}"),
            quantity: qty,
            unit_price: price,
            subtotal: i64::from(qty) * price,
            buy_price: buy,
            sold_on: on,
        }
    }

    #[test]
    fn test_summarize_sales() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2025, 3, 11).unwrap();
        let lines = vec![
            line(1, 2, 5000, Some(3000), today),
            line(2, 1, 10_000, Some(7000), yesterday),
            // 商品已删除：计入营收，不计利润
            line(3, 4, 1000, None, today),
        ];

        let s = summarize_sales(&lines, today);
        assert_eq!(s.revenue, 10_000 + 10_000 + 4000);
        assert_eq!(s.profit, 4000 + 3000);
        assert_eq!(s.today_profit, 4000);
    }

    #[test]
    fn test_top_sellers_orders_by_quantity() {
        let d = NaiveDate::from_ymd_opt(2025, 3, 12).unwrap();
        let lines = vec![
            line(1, 2, 100, None, d),
            line(2, 5, 100, None, d),
            line(1, 4, 100, None, d),
            line(3, 6, 100, None, d),
        ];

        let top = top_sellers(&lines, 2);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].item_id, top[0].quantity), (1, 6));
        assert_eq!((top[1].item_id, top[1].quantity), (3, 6));
    }
}
