//! Cart arithmetic shared by transaction creation, PATCH and checkout.
//!
//! All amounts are integers in the smallest currency unit.

use crate::error::{AppError, AppResult};

/// A priced cart line, before it is persisted as a `transaction_items` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub item_id: i64,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

/// Custom price wins when present and non-negative, otherwise the catalog price.
pub fn resolve_unit_price(catalog_price: i64, custom_price: Option<i64>) -> i64 {
    match custom_price {
        Some(p) if p >= 0 => p,
        _ => catalog_price,
    }
}

pub fn price_line(
    item_id: i64,
    item_name: &str,
    quantity: i32,
    catalog_price: i64,
    custom_price: Option<i64>,
) -> AppResult<PricedLine> {
    if quantity <= 0 {
        return Err(AppError::ValidationError(format!(
            "Invalid quantity for item {item_id}"
        )));
    }
    let unit_price = resolve_unit_price(catalog_price, custom_price);
    let subtotal = i64::from(quantity)
        .checked_mul(unit_price)
        .ok_or_else(|| AppError::ValidationError(format!("Subtotal overflow for item {item_id}")))?;

    Ok(PricedLine {
        item_id,
        item_name: item_name.to_string(),
        quantity,
        unit_price,
        subtotal,
    })
}

/// Only positive discounts count; anything else is treated as no discount.
pub fn normalize_discount(discount: Option<i64>) -> i64 {
    match discount {
        Some(d) if d > 0 => d,
        _ => 0,
    }
}

/// `max(0, Σ subtotals − discount)`
pub fn final_total<I>(subtotals: I, discount: i64) -> AppResult<i64>
where
    I: IntoIterator<Item = i64>,
{
    let gross = subtotals
        .into_iter()
        .try_fold(0i64, |acc, s| acc.checked_add(s))
        .ok_or_else(|| AppError::ValidationError("Transaction total overflow".to_string()))?;
    Ok(gross.saturating_sub(discount).max(0))
}

/// Validates the tendered amount and returns the change.
pub fn settle_payment(total: i64, payment: Option<i64>) -> AppResult<i64> {
    match payment {
        Some(paid) if paid >= total => Ok(paid - total),
        Some(_) => Err(AppError::ValidationError("Payment not enough".to_string())),
        None => Err(AppError::ValidationError(
            "Payment amount is required to complete a transaction".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_unit_price() {
        assert_eq!(resolve_unit_price(3500, None), 3500);
        assert_eq!(resolve_unit_price(3500, Some(3000)), 3000);
        // 0 is a valid custom price (free item)
        assert_eq!(resolve_unit_price(3500, Some(0)), 0);
        assert_eq!(resolve_unit_price(3500, Some(-1)), 3500);
    }

    #[test]
    fn test_price_line() {
        let line = price_line(1, "Teh Botol", 3, 5000, None).unwrap();
        assert_eq!(line.unit_price, 5000);
        assert_eq!(line.subtotal, 15000);

        assert!(price_line(1, "Teh Botol", 0, 5000, None).is_err());
        assert!(price_line(1, "Teh Botol", -2, 5000, None).is_err());
    }

    #[test]
    fn test_final_total_with_discount() {
        assert_eq!(final_total([15000, 7000], 0).unwrap(), 22000);
        assert_eq!(final_total([15000, 7000], 2000).unwrap(), 20000);
        // discount larger than gross is floored at zero
        assert_eq!(final_total([1000], 5000).unwrap(), 0);
        assert_eq!(final_total([1000], i64::MAX).unwrap(), 0);
        assert_eq!(final_total(Vec::<i64>::new(), 0).unwrap(), 0);
    }

    #[test]
    fn test_final_total_overflow_is_rejected() {
        let half = i64::MAX / 2 + 1;
        let err = final_total([half, half], 0).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_normalize_discount() {
        assert_eq!(normalize_discount(None), 0);
        assert_eq!(normalize_discount(Some(-500)), 0);
        assert_eq!(normalize_discount(Some(0)), 0);
        assert_eq!(normalize_discount(Some(500)), 500);
    }

    #[test]
    fn test_settle_payment() {
        assert_eq!(settle_payment(50_000, Some(60_000)).unwrap(), 10_000);
        assert_eq!(settle_payment(50_000, Some(50_000)).unwrap(), 0);
        assert!(settle_payment(50_000, Some(49_999)).is_err());
        assert!(settle_payment(50_000, None).is_err());
    }
}
