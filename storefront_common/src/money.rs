use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

//--------------------------------------       Money         ---------------------------------------------------------
/// A monetary amount in the storefront's currency units.
///
/// Amounts are carried as `f64` end to end (JSON numbers in, SQLite `REAL` at rest), so a value written to the ledger
/// reads back bit-for-bit identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Money(f64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, AddAssign, add_assign);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<f64> for Money {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl From<f64> for Money {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "${:0.2}", self.0)
    }
}

impl Money {
    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_valid_price(&self) -> bool {
        self.0.is_finite() && self.0 >= 0.0
    }
}

//--------------------------------------    DiscountRate     ---------------------------------------------------------
/// A fractional discount in the half-open range `[0, 1)`. A rate of `0.1` takes 10% off.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(try_from = "f64", into = "f64")]
pub struct DiscountRate(f64);

#[derive(Debug, Clone, PartialEq, Error)]
#[error("A discount rate must be a fraction in [0, 1). Got {0}")]
pub struct DiscountRateError(pub f64);

impl DiscountRate {
    pub const fn zero() -> Self {
        Self(0.0)
    }

    pub fn new(rate: f64) -> Result<Self, DiscountRateError> {
        if rate.is_finite() && (0.0..1.0).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(DiscountRateError(rate))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// The amount payable for `subtotal` once this discount is taken off.
    pub fn apply(&self, subtotal: Money) -> Money {
        subtotal * (1.0 - self.0)
    }
}

impl TryFrom<f64> for DiscountRate {
    type Error = DiscountRateError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DiscountRate> for f64 {
    fn from(rate: DiscountRate) -> Self {
        rate.0
    }
}

impl Display for DiscountRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}%", self.0 * 100.0)
    }
}
