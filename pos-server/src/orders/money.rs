//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to
//! `f64` for storage/serialization.

use crate::orders::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::{OrderSnapshot, OrderTotals, PaymentInput, PaymentRecord};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per item
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i32 = 9999;
/// Maximum allowed payment amount
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidState(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a menu price before it is frozen into an order line
pub fn validate_price(price: f64) -> Result<(), OrderError> {
    require_finite(price, "price")?;
    if price < 0.0 {
        return Err(OrderError::InvalidState(format!(
            "price must be non-negative, got {}",
            price
        )));
    }
    if price > MAX_PRICE {
        return Err(OrderError::InvalidState(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a quantity delta and the line quantity it would produce
pub fn validate_qty(qty: i32) -> Result<(), OrderError> {
    if qty > MAX_QUANTITY {
        return Err(OrderError::InvalidDelta(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, qty
        )));
    }
    Ok(())
}

/// Validate a PaymentInput before processing
pub fn validate_payment(payment: &PaymentInput) -> Result<(), OrderError> {
    require_finite(payment.amount, "payment amount")?;
    if payment.amount <= 0.0 {
        return Err(OrderError::InvalidState(format!(
            "payment amount must be positive, got {}",
            payment.amount
        )));
    }
    if payment.amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::InvalidState(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, payment.amount
        )));
    }
    if payment.method.trim().is_empty() {
        return Err(OrderError::InvalidState(
            "payment method must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Compute order totals from an item list and the frozen charge policy.
///
/// - `sub_total` = Σ price_snapshot × qty
/// - `tax_total` = sub_total × tax_percent / 100
/// - `discount_total` = sub_total × discount_percent / 100
/// - `grand_total` = max(0, sub_total + tax_total − discount_total)
///
/// Pure and idempotent; no fields other than the returned totals are touched.
pub fn compute_totals(
    items: &[shared::order::OrderItem],
    policy: &shared::order::ChargePolicy,
) -> OrderTotals {
    let mut sub_total = Decimal::ZERO;
    for item in items {
        sub_total += to_decimal(item.price_snapshot) * Decimal::from(item.qty);
    }

    let tax_total = (sub_total * to_decimal(policy.tax_percent) / Decimal::ONE_HUNDRED)
        .round_dp(DECIMAL_PLACES);
    let discount_total = (sub_total * to_decimal(policy.discount_percent) / Decimal::ONE_HUNDRED)
        .round_dp(DECIMAL_PLACES);

    let grand_total = (sub_total + tax_total - discount_total).max(Decimal::ZERO);

    OrderTotals {
        sub_total: to_f64(sub_total),
        tax_total: to_f64(tax_total),
        discount_total: to_f64(discount_total),
        grand_total: to_f64(grand_total),
    }
}

/// Recalculate a snapshot's totals in place.
///
/// Must run after every item mutation; totals are never stored independently
/// of the item list.
pub fn recalculate_totals(snapshot: &mut OrderSnapshot) {
    snapshot.totals = compute_totals(&snapshot.items, &snapshot.charge_policy);
}

/// Sum payment amounts with precise arithmetic
pub fn sum_payments(payments: &[PaymentRecord]) -> f64 {
    let total: Decimal = payments.iter().map(|p| to_decimal(p.amount)).sum();
    to_f64(total)
}

/// Check if payment is sufficient (with small tolerance for edge cases)
///
/// Returns true if paid >= required - 0.01
pub fn is_payment_sufficient(paid: f64, required: f64) -> bool {
    let paid_dec = to_decimal(paid);
    let required_dec = to_decimal(required);
    paid_dec >= required_dec - MONEY_TOLERANCE
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff <= MONEY_TOLERANCE
}
