use serde::Serialize;

use crate::error::{AppError, AppResult};

/// Net cash movement from completed cash sales inside a session window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CashTally {
    pub total_cash_in: i64,
    pub total_change: i64,
}

impl CashTally {
    /// Folds `(payment, change)` pairs; missing values count as zero.
    pub fn from_payments<I>(payments: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (Option<i64>, Option<i64>)>,
    {
        payments
            .into_iter()
            .try_fold(CashTally::default(), |acc, (payment, change)| {
                Ok(CashTally {
                    total_cash_in: checked(acc.total_cash_in.checked_add(payment.unwrap_or(0)))?,
                    total_change: checked(acc.total_change.checked_add(change.unwrap_or(0)))?,
                })
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciliation {
    pub expected_cash: i64,
    pub difference: i64,
}

/// expected = opening + cash in − change; difference = declared − expected
pub fn reconcile(
    opening_cash: i64,
    tally: CashTally,
    declared_cash: i64,
) -> AppResult<Reconciliation> {
    let expected_cash = checked(
        opening_cash
            .checked_add(tally.total_cash_in)
            .and_then(|v| v.checked_sub(tally.total_change)),
    )?;
    let difference = checked(declared_cash.checked_sub(expected_cash))?;
    Ok(Reconciliation {
        expected_cash,
        difference,
    })
}

fn checked(value: Option<i64>) -> AppResult<i64> {
    value.ok_or_else(|| AppError::ValidationError("Cash amount out of range".to_string()))
}
