use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens when a sale needs more units than the catalog holds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StockUnderflowPolicy {
    /// Reject the sale.
    Block,
    /// Sell anyway, stock ends at zero, caller gets a warning.
    #[default]
    Clamp,
    /// Sell anyway, stock goes negative, caller gets a warning.
    AllowNegative,
}

impl fmt::Display for StockUnderflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockUnderflowPolicy::Block => write!(f, "block"),
            StockUnderflowPolicy::Clamp => write!(f, "clamp"),
            StockUnderflowPolicy::AllowNegative => write!(f, "allow_negative"),
        }
    }
}

impl FromStr for StockUnderflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(StockUnderflowPolicy::Block),
            "clamp" => Ok(StockUnderflowPolicy::Clamp),
            "allow_negative" => Ok(StockUnderflowPolicy::AllowNegative),
            other => Err(format!("unknown stock underflow policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub new_stock: i32,
    pub warning: Option<String>,
}

impl StockUnderflowPolicy {
    pub fn decrement(self, item_name: &str, current: i32, quantity: i32) -> AppResult<StockDecrement> {
        if current >= quantity {
            return Ok(StockDecrement {
                new_stock: current - quantity,
                warning: None,
            });
        }

        match self {
            StockUnderflowPolicy::Block => Err(AppError::ValidationError(format!(
                "Item '{item_name}' stock insufficient (current: {current}, required: {quantity})"
            ))),
            StockUnderflowPolicy::Clamp => Ok(StockDecrement {
                new_stock: 0,
                warning: Some(format!(
                    "Warning: Item '{item_name}' stock insufficient (current: {current}, required: {quantity})"
                )),
            }),
            StockUnderflowPolicy::AllowNegative => Ok(StockDecrement {
                new_stock: current.checked_sub(quantity).ok_or_else(|| {
                    AppError::ValidationError(format!("Stock of item '{item_name}' out of range"))
                })?,
                warning: Some(format!(
                    "Warning: Item '{item_name}' stock is now negative (current: {current}, required: {quantity})"
                )),
            }),
        }
    }
}
