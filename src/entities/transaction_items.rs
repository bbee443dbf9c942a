use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 交易明细，创建后不可变；名称与单价为成交时快照。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub price: i64,
    pub subtotal: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
