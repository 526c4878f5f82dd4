use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::*;
use payment_common::Amount;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(pub String);

//--------------------------------------    PaymentStatus      ---------------------------------------------------------
/// The local status of a payment.
///
/// The numeric codes are the ones PayHere uses for the `status_code` field of its payment notifications, so a
/// notification's status can be stored without translation.
///
/// `Pending` is the only status that may change. Every other status is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[repr(i32)]
#[serde(try_from = "i32", into = "i32")]
pub enum PaymentStatus {
    Pending = 0,
    Cancelled = -1,
    Failed = -2,
    Chargedback = -3,
    Success = 2,
}

impl PaymentStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_terminal(self) -> bool {
        self != Self::Pending
    }

    /// Parses the `status_code` field of a payment notification. The codes are shared with the local enum, so no
    /// mapping table is involved (contrast with [`crate::status_mapper::map_remote_status`]).
    pub fn from_webhook_code(code: &str) -> Result<Self, ConversionError> {
        let code = code.trim();
        let value = code.parse::<i32>().map_err(|e| ConversionError(format!("status code '{code}'. {e}")))?;
        Self::try_from(value)
    }
}

impl TryFrom<i32> for PaymentStatus {
    type Error = ConversionError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pending),
            -1 => Ok(Self::Cancelled),
            -2 => Ok(Self::Failed),
            -3 => Ok(Self::Chargedback),
            2 => Ok(Self::Success),
            v => Err(ConversionError(format!("{v} is not a payment status code"))),
        }
    }
}

impl From<PaymentStatus> for i32 {
    fn from(value: PaymentStatus) -> Self {
        value.code()
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "PENDING"),
            PaymentStatus::Cancelled => write!(f, "CANCELLED"),
            PaymentStatus::Failed => write!(f, "FAILED"),
            PaymentStatus::Chargedback => write!(f, "CHARGEDBACK"),
            PaymentStatus::Success => write!(f, "SUCCESS"),
        }
    }
}

//--------------------------------------       Currency        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Lkr,
    Usd,
    Gbp,
    Eur,
    Aud,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Lkr => "LKR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
            Currency::Eur => "EUR",
            Currency::Aud => "AUD",
        }
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LKR" => Ok(Self::Lkr),
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            "EUR" => Ok(Self::Eur),
            "AUD" => Ok(Self::Aud),
            _ => {
                debug!("Unsupported currency: {s}");
                Err(ConversionError(format!("Unsupported currency: {s}")))
            },
        }
    }
}

//--------------------------------------     PaymentRecord     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Assigned by storage, and shared with PayHere as the payment's order id.
    pub order_id: i64,
    pub merchant_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub items: String,
    pub amount: Amount,
    pub currency: Currency,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewPayment       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub merchant_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub amount: Amount,
    pub currency: Currency,
}

impl NewPayment {
    pub fn new(merchant_id: &str, amount: Amount) -> Self {
        Self {
            merchant_id: merchant_id.to_string(),
            first_name: String::default(),
            last_name: String::default(),
            email: String::default(),
            phone: String::default(),
            address: String::default(),
            city: String::default(),
            country: String::default(),
            amount,
            currency: Currency::default(),
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }
}

//--------------------------------------     StatusUpdate      ---------------------------------------------------------
/// The result of a conditional status write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The payment was pending and now has the requested status.
    Updated(PaymentRecord),
    /// The payment already had the requested status. Nothing was written.
    Unchanged(PaymentRecord),
    /// The payment is terminal with a different status. Nothing was written.
    Rejected(PaymentRecord),
    /// There is no payment for the order id.
    NotFound,
}
