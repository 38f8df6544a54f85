//! Numeric abstraction shared by every curve builder and criterion.
//!
//! The associated constructors double as the number factory: generic code
//! builds its constants through `N::zero()`, `N::one()` and `N::hundred()`
//! so that they carry the precision chosen at the call site.

use rust_decimal::prelude::{FromPrimitive, MathematicalOps, ToPrimitive};
use rust_decimal::Decimal;
use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

pub trait Num:
    Copy
    + PartialOrd
    + Debug
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    fn zero() -> Self;
    fn one() -> Self;
    fn hundred() -> Self;
    fn from_i64(value: i64) -> Self;
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    fn abs(self) -> Self;
    /// Square root; callers guard against negative input.
    fn sqrt(self) -> Self;
    fn powf(self, exponent: f64) -> Self;
    /// Natural logarithm; callers guard against non-positive input.
    fn ln(self) -> Self;

    fn from_usize(value: usize) -> Self {
        Self::from_i64(value as i64)
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    fn is_positive(&self) -> bool {
        *self > Self::zero()
    }
}

impl Num for f64 {
    fn zero() -> Self {
        0.0
    }

    fn one() -> Self {
        1.0
    }

    fn hundred() -> Self {
        100.0
    }

    fn from_i64(value: i64) -> Self {
        value as f64
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }

    fn abs(self) -> Self {
        f64::abs(self)
    }

    fn sqrt(self) -> Self {
        f64::sqrt(self)
    }

    fn powf(self, exponent: f64) -> Self {
        f64::powf(self, exponent)
    }

    fn ln(self) -> Self {
        f64::ln(self)
    }
}

impl Num for Decimal {
    fn zero() -> Self {
        Decimal::ZERO
    }

    fn one() -> Self {
        Decimal::ONE
    }

    fn hundred() -> Self {
        Decimal::ONE_HUNDRED
    }

    fn from_i64(value: i64) -> Self {
        Decimal::from(value)
    }

    /// Non-finite doubles have no decimal representation and map to zero.
    fn from_f64(value: f64) -> Self {
        <Decimal as FromPrimitive>::from_f64(value).unwrap_or(Decimal::ZERO)
    }

    fn to_f64(self) -> f64 {
        ToPrimitive::to_f64(&self).unwrap_or(f64::NAN)
    }

    fn abs(self) -> Self {
        Decimal::abs(&self)
    }

    fn sqrt(self) -> Self {
        MathematicalOps::sqrt(&self).unwrap_or(Decimal::ZERO)
    }

    fn powf(self, exponent: f64) -> Self {
        match self.checked_powf(exponent) {
            Some(value) => value,
            None => <Decimal as Num>::from_f64(Num::to_f64(self).powf(exponent)),
        }
    }

    fn ln(self) -> Self {
        self.checked_ln().unwrap_or(Decimal::ZERO)
    }
}
