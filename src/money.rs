//! Conversion between decimal amounts and the integer minor units (cents)
//! stored in the database.

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::Error;

/// The number of fractional digits in a stored amount.
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Convert `amount` to minor units, e.g. `12.34` to `1234`.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `amount` has more than two decimal places
/// or does not fit in an `i64` once converted.
pub fn to_minor_units(amount: Decimal) -> Result<i64, Error> {
    if amount.normalize().scale() > MINOR_UNIT_SCALE {
        return Err(Error::InvalidAmount(format!(
            "{amount} has more than {MINOR_UNIT_SCALE} decimal places"
        )));
    }

    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|minor_units| minor_units.to_i64())
        .ok_or_else(|| Error::InvalidAmount(format!("{amount} is too large")))
}

/// Convert minor units to a decimal amount with two decimal places.
pub fn from_minor_units(minor_units: i64) -> Decimal {
    Decimal::new(minor_units, MINOR_UNIT_SCALE)
}

/// Validate that `amount` can be moved into an account and convert it to minor units.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `amount` is zero or negative, or is not a
/// valid amount of money according to [to_minor_units].
pub fn positive_minor_units(amount: Decimal) -> Result<i64, Error> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "amount must be greater than zero, got {amount}"
        )));
    }

    to_minor_units(amount)
}
