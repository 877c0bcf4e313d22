use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a discount value is applied to a unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountUnit {
    /// `value` is a percentage of the unit price.
    Percent,
    /// `value` is subtracted from the unit price.
    Amount,
}

impl DiscountUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountUnit::Percent => "percent",
            DiscountUnit::Amount => "amount",
        }
    }
}

impl fmt::Display for DiscountUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiscountUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percent" => Ok(DiscountUnit::Percent),
            "amount" => Ok(DiscountUnit::Amount),
            other => Err(format!("unknown discount unit '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub value: Decimal,
    pub unit: DiscountUnit,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl Discount {
    /// Whether `at` falls inside `[valid_from, valid_until)`.
    pub fn is_applicable_at(&self, at: DateTime<Utc>) -> bool {
        self.valid_from <= at && at < self.valid_until
    }
}
