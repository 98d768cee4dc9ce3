//! Summary figures derived from collections a view already holds.

use chrono::NaiveDate;

use crate::expiry::{self, ExpiryStatus, InvalidDateError};
use crate::models::{Movement, Product};

/// Sum of `stock` over all products. Widened to `u64` so a large catalog
/// cannot overflow.
pub fn total_stock(products: &[Product]) -> u64 {
    products.iter().map(|p| u64::from(p.stock)).sum()
}

/// Products whose expiration falls within the next week. Products without a
/// date use `today + default_days`.
pub fn near_expiry(
    products: &[Product],
    reference: NaiveDate,
    default_days: i64,
) -> Result<Vec<Product>, InvalidDateError> {
    with_status(products, reference, default_days, ExpiryStatus::Near)
}

pub fn expired(
    products: &[Product],
    reference: NaiveDate,
    default_days: i64,
) -> Result<Vec<Product>, InvalidDateError> {
    with_status(products, reference, default_days, ExpiryStatus::Expired)
}

fn with_status(
    products: &[Product],
    reference: NaiveDate,
    default_days: i64,
    wanted: ExpiryStatus,
) -> Result<Vec<Product>, InvalidDateError> {
    let mut out = Vec::new();
    for product in products {
        let date = product.expiration_or_default(reference, default_days)?;
        if expiry::classify(date, reference) == wanted {
            out.push(product.clone());
        }
    }
    Ok(out)
}

/// The last `n` movements in creation order, most recent first.
pub fn recent(movements: &[Movement], n: usize) -> Vec<Movement> {
    movements.iter().rev().take(n).cloned().collect()
}
