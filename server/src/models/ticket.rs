use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an assigned ticket can still be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignmentStatus {
    Use,
    Useless,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Use => "use",
            AssignmentStatus::Useless => "useless",
        }
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "use" => Ok(AssignmentStatus::Use),
            "useless" => Ok(AssignmentStatus::Useless),
            other => Err(format!("unknown assignment status '{other}'")),
        }
    }
}

/// One ticket purchase: an attendee holding `quantity` tickets for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketAssignment {
    pub id: Uuid,
    pub event_id: Uuid,
    pub attendance_id: Uuid,
    pub price: Decimal,
    pub quantity: i32,
    pub ticket_type: String,
    pub purchase_date: DateTime<Utc>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryStatus {
    Available,
    SoldOut,
}

impl InventoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InventoryStatus::Available => "available",
            InventoryStatus::SoldOut => "sold_out",
        }
    }
}

impl fmt::Display for InventoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InventoryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(InventoryStatus::Available),
            "sold_out" => Ok(InventoryStatus::SoldOut),
            other => Err(format!("unknown inventory status '{other}'")),
        }
    }
}

/// Ticket inventory counters for a single event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTicket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub total_quantity: i32,
    pub sold_quantity: i32,
    pub status: InventoryStatus,
}

impl EventTicket {
    pub fn remaining(&self) -> i32 {
        (self.total_quantity - self.sold_quantity).max(0)
    }

    /// Counts one more sold ticket, flipping to `SoldOut` once nothing remains.
    pub fn record_sale(&mut self) {
        self.sold_quantity += 1;
        if self.remaining() == 0 {
            self.status = InventoryStatus::SoldOut;
        }
    }
}
