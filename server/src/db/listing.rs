//! Row shapes and query filters for the operator screens.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{BidStatus, Event, EventBid, Role};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFilter {
    pub role: Option<Role>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProfileListing {
    pub account_id: Uuid,
    pub username: String,
    pub email: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VendorFilter {
    pub base_state: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct VendorListing {
    pub id: Uuid,
    pub account_id: Uuid,
    pub username: String,
    pub company_name: String,
    pub base_city: String,
    pub base_state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub is_published: Option<bool>,
    pub state: Option<String>,
    pub date: Option<NaiveDate>,
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EventListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub event: Event,
    pub created_by_username: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidFilter {
    pub status: Option<BidStatus>,
    pub q: Option<String>,
}

/// A bid with the names an operator or event owner needs to read it.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct BidListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub bid: EventBid,
    pub event_title: String,
    pub vendor_company: String,
}
