use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::UnknownVariant;

/// Bid workflow state. Only `Submitted` is reached through the public
/// handlers; the other two are set by operators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    #[default]
    Submitted,
    Accepted,
    Rejected,
}

impl BidStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BidStatus::Submitted => "submitted",
            BidStatus::Accepted => "accepted",
            BidStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BidStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "submitted" => Ok(BidStatus::Submitted),
            "accepted" => Ok(BidStatus::Accepted),
            "rejected" => Ok(BidStatus::Rejected),
            other => Err(UnknownVariant {
                kind: "bid status",
                value: other.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for BidStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventBid {
    pub id: Uuid,
    pub event_id: Uuid,
    pub vendor_id: Uuid,
    pub message: String,
    pub estimated_budget: Option<Decimal>,
    #[sqlx(try_from = "String")]
    pub status: BidStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated bid form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BidDraft {
    pub message: String,
    pub estimated_budget: Option<Decimal>,
}
