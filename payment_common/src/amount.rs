use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

//--------------------------------------       Amount         ---------------------------------------------------------
/// A non-negative monetary amount, stored as an integer number of cents.
///
/// The gateway signs amounts using `%.2f` formatting, so keeping the value in minor units means [`Display`] always
/// renders exactly what the gateway expects, with no floating point rounding surprises.
///
/// On the wire (JSON) amounts are plain numbers, e.g. `1000.5`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value cannot be represented as an amount: {0}")]
pub struct AmountConversionError(String);

impl Amount {
    pub fn from_cents(cents: i64) -> Result<Self, AmountConversionError> {
        if cents < 0 {
            return Err(AmountConversionError(format!("{cents} cents is negative")));
        }
        Ok(Self(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl TryFrom<f64> for Amount {
    type Error = AmountConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() || value < 0.0 {
            return Err(AmountConversionError(value.to_string()));
        }
        // Ties go to even, as `%.2f` does for exactly representable halves
        let cents = (value * 100.0).round_ties_even();
        if cents > i64::MAX as f64 {
            return Err(AmountConversionError(format!("{value} is too large")));
        }
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self(cents as i64))
    }
}

impl From<Amount> for f64 {
    fn from(value: Amount) -> Self {
        value.as_f64()
    }
}

/// Parses decimal strings such as `"1000"`, `"1000.5"` or `"1000.50"`. More than two decimal places is an error,
/// since the value could not be signed faithfully.
impl FromStr for Amount {
    type Err = AmountConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || AmountConversionError(s.to_string());
        let s = s.trim();
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() || frac.len() > 2 {
            return Err(err());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }
        let whole = whole.parse::<i64>().map_err(|_| err())?;
        let frac = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().map_err(|_| err())? * 10,
            _ => frac.parse::<i64>().map_err(|_| err())?,
        };
        whole.checked_mul(100).and_then(|c| c.checked_add(frac)).map(Self).ok_or_else(err)
    }
}

/// Always renders two decimal places, matching `%.2f`.
impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}
