//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Summed over 150 lab-test lines the drift becomes visible on the bill. │
//! │                                                                         │
//! │  OUR SOLUTION: Base-10 Decimal                                          │
//! │    0.1 + 0.2 = 0.3 exactly, 28 significant digits                       │
//! │    Rounding happens ONCE, when the amount is displayed                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medbill_core::money::Money;
//!
//! let consultation: Money = "500".parse().unwrap();
//! let lab_test = Money::from_minor(15000); // 150.00
//!
//! let total = consultation + lab_test;
//! assert_eq!(total.to_string(), "650.00");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Number of decimal places shown on printed invoices.
pub const DISPLAY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in currency units (rupees, dollars...), held as an exact
/// decimal.
///
/// ## Design Decisions
/// - **Signed**: a negative value is a legal balance (discount above subtotal)
/// - **Unrounded**: arithmetic keeps full precision, `Display` rounds
/// - **Transparent serde**: serializes as a decimal string, accepts numbers
///   or strings on input
///
/// ## Where Money is Used
/// ```text
/// LineItem.unit_price ──► LineItem.line_total ──► InvoiceTotals.subtotal
///                                                      │
///        discount / tax / shipping ───────────────────►│
///                                                      ▼
///                                            InvoiceTotals.total
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates an amount from minor units (paise, cents).
    ///
    /// ```rust
    /// use medbill_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1099).to_string(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, 2))
    }

    /// Returns the exact underlying amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is strictly greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is strictly less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Returns the amount rounded for display, using Bankers Rounding
    /// (round half to even).
    ///
    /// ```rust
    /// use medbill_core::money::Money;
    ///
    /// let a: Money = "2.345".parse().unwrap();
    /// let b: Money = "2.355".parse().unwrap();
    /// assert_eq!(a.rounded().to_string(), "2.34");
    /// assert_eq!(b.rounded().to_string(), "2.36");
    /// ```
    pub fn rounded(&self) -> Decimal {
        self.0.round_dp(DISPLAY_SCALE)
    }

    /// Multiplies a unit price by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use medbill_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let unit_price = Money::from_minor(15000);
    /// let line_total = unit_price.checked_mul_quantity(Decimal::from(2)).unwrap();
    /// assert_eq!(line_total, Money::from_minor(30000));
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, quantity: Decimal) -> Option<Self> {
        self.0.checked_mul(quantity).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts two amounts, `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Displays the amount rounded to two decimal places, without a currency
/// symbol (the print view decides on one).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.rounded())
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Money)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl From<i64> for Money {
    fn from(whole_units: i64) -> Self {
        Money(Decimal::from(whole_units))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
