use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::{Role, item_entity};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemRequest {
    #[schema(example = "Indomie Goreng")]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub buy_price: i64,
    #[schema(example = 3500)]
    pub price: i64,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemQuery {
    pub page: Option<u64>,
    #[serde(alias = "limit")]
    pub page_size: Option<u64>,
    /// 名称搜索，空格分隔的每个词都必须出现
    pub name: Option<String>,
}

/// 管理员可见的完整商品信息
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub stock: i32,
    pub buy_price: i64,
    pub price: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 收银员与公开接口可见的商品信息（不含进价）
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CashierItemResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub stock: i32,
    pub price: i64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which item fields a caller may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAccess {
    Full,
    Restricted,
}

impl From<Role> for FieldAccess {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => FieldAccess::Full,
            Role::Cashier => FieldAccess::Restricted,
        }
    }
}

impl FieldAccess {
    /// Anonymous callers get the cashier view.
    pub fn for_caller(role: Option<Role>) -> Self {
        role.map(FieldAccess::from).unwrap_or(FieldAccess::Restricted)
    }

    pub fn csv_headers(self) -> &'static [&'static str] {
        match self {
            FieldAccess::Full => &[
                "id",
                "name",
                "description",
                "stock",
                "buy_price",
                "price",
                "image_url",
                "created_at",
                "updated_at",
            ],
            FieldAccess::Restricted => &[
                "id",
                "name",
                "description",
                "stock",
                "price",
                "image_url",
                "created_at",
                "updated_at",
            ],
        }
    }

    pub fn csv_row(self, item: &item_entity::Model) -> Vec<String> {
        let mut row = vec![
            item.id.to_string(),
            item.name.clone(),
            item.description.clone().unwrap_or_default(),
            item.stock.to_string(),
        ];
        if self == FieldAccess::Full {
            row.push(item.buy_price.to_string());
        }
        row.push(item.price.to_string());
        row.push(item.image_url.clone().unwrap_or_default());
        row.push(item.created_at.to_rfc3339());
        row.push(item.updated_at.to_rfc3339());
        row
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ItemView {
    Full(ItemResponse),
    Restricted(CashierItemResponse),
}

impl ItemView {
    pub fn project(item: item_entity::Model, access: FieldAccess) -> Self {
        match access {
            FieldAccess::Full => ItemView::Full(ItemResponse {
                id: item.id,
                name: item.name,
                description: item.description,
                stock: item.stock,
                buy_price: item.buy_price,
                price: item.price,
                image_url: item.image_url,
                created_at: item.created_at,
                updated_at: item.updated_at,
            }),
            FieldAccess::Restricted => ItemView::Restricted(CashierItemResponse {
                id: item.id,
                name: item.name,
                description: item.description,
                stock: item.stock,
                price: item.price,
                image_url: item.image_url,
                created_at: item.created_at,
                updated_at: item.updated_at,
            }),
        }
    }
}
