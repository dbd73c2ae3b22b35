//! Monetary and point amounts
//!
//! Both are fixed-point with two decimal places, stored as integer
//! hundredths. Division rounds half to even on the second decimal place.

use serde::{Deserialize, Serialize};

/// Monetary amount in minor units (paise). `Money(2_500_000)` is 25000.00.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Money(pub u64);

impl Money {
    pub fn new(minor: u64) -> Self {
        Self(minor)
    }

    /// Whole currency units (rupees)
    pub fn from_major(major: u64) -> Self {
        Self(major.saturating_mul(100))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn minor(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Equal share of this amount across `parts`, rounded half to even.
    /// `parts` of zero is treated as one.
    pub fn share(self, parts: u64) -> Self {
        Self(div_round_half_even(self.0, parts.max(1)))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Reward points in hundredths. `Points(2_500)` is 25.00 points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Points(pub u64);

impl Points {
    pub fn new(hundredths: u64) -> Self {
        Self(hundredths)
    }

    pub fn whole(points: u64) -> Self {
        Self(points.saturating_mul(100))
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn hundredths(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Equal share of these points across `parts`, rounded half to even.
    /// `parts` of zero is treated as one.
    pub fn share(self, parts: u64) -> Self {
        Self(div_round_half_even(self.0, parts.max(1)))
    }
}

impl std::fmt::Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Integer division rounding half to even. `den` must be non-zero.
fn div_round_half_even(num: u64, den: u64) -> u64 {
    let quotient = num / den;
    let remainder = num % den;
    // Compare 2r against den without overflowing for large remainders
    let twice = u128::from(remainder) * 2;
    let den = u128::from(den);
    if twice > den || (twice == den && quotient % 2 == 1) {
        quotient + 1
    } else {
        quotient
    }
}
