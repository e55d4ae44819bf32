use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_COUNTRY: &str = "US";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub city: String,
    /// Two-letter state code kept as plain text.
    pub state: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub needs_sound: bool,
    pub needs_lighting: bool,
    pub needs_video: bool,
    pub needs_staging: bool,
    pub full_service_package: bool,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_owned_by(&self, account_id: Uuid) -> bool {
        self.created_by == account_id
    }

    pub fn publication_label(&self) -> &'static str {
        if self.is_published {
            "published"
        } else {
            "unpublished"
        }
    }
}

/// Validated event form data, shared by create and edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub city: String,
    pub state: String,
    pub needs_sound: bool,
    pub needs_lighting: bool,
    pub needs_video: bool,
    pub needs_staging: bool,
    pub full_service_package: bool,
}
