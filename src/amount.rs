//! A non-negative amount of money with at most two decimal places.
//!
//! Amounts are stored in the database as text so that values like `12.34`
//! are read back exactly instead of going through a floating point number.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;

/// The number of decimal places amounts are stored with.
pub const DECIMAL_PLACES: u32 = 2;

/// The largest amount that fits in ten digits with two decimal places.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// The reasons a string or number is not a valid [Amount].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AmountError {
    /// The text is empty or is not a decimal number.
    #[error("Enter an amount, e.g. 12.34")]
    NotANumber,

    /// The amount is less than zero.
    #[error("Amount cannot be negative")]
    Negative,

    /// The amount has non-zero digits after the second decimal place.
    #[error("Amount can have at most 2 decimal places")]
    TooManyDecimalPlaces,

    /// The amount has more than ten digits.
    #[error("Amount cannot be larger than 99,999,999.99")]
    TooLarge,
}

/// An amount of money, e.g. the cost of an expense or a monthly budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// The amount used when no budget has been set.
    pub const ZERO: Amount = Amount(Decimal::from_parts(0, 0, 0, false, DECIMAL_PLACES));

    /// Create a validated amount.
    ///
    /// # Errors
    ///
    /// Returns an [AmountError] if `value` is negative, has more than two
    /// significant decimal places, or has more than ten digits.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative);
        }

        let mut value = value.normalize();

        if value.scale() > DECIMAL_PLACES {
            return Err(AmountError::TooManyDecimalPlaces);
        }

        if value > MAX_AMOUNT {
            return Err(AmountError::TooLarge);
        }

        value.rescale(DECIMAL_PLACES);

        Ok(Self(value))
    }

    /// Create an amount without validation.
    ///
    /// The caller should ensure that `value` is non-negative and within the
    /// stored precision.
    #[cfg(test)]
    pub fn new_unchecked(value: Decimal) -> Self {
        let mut value = value;
        value.rescale(DECIMAL_PLACES);
        Self(value)
    }

    /// The amount as a decimal number with two decimal places.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(raw_amount: &str) -> Result<Self, Self::Err> {
        let raw_amount = raw_amount.trim();

        if raw_amount.is_empty() || raw_amount.contains('_') {
            return Err(AmountError::NotANumber);
        }

        let value = Decimal::from_str_exact(raw_amount).map_err(|error| match error {
            rust_decimal::Error::Underflow | rust_decimal::Error::ScaleExceedsMaximumPrecision(_) => {
                AmountError::TooManyDecimalPlaces
            }
            rust_decimal::Error::ExceedsMaximumPossibleValue => AmountError::TooLarge,
            _ => AmountError::NotANumber,
        })?;

        Amount::new(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0.to_string()))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        let decimal =
            Decimal::from_str(text).map_err(|error| FromSqlError::Other(Box::new(error)))?;

        Amount::new(decimal).map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}
