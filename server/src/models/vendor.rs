use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Vendor-specific attributes, created lazily on first profile save.
///
/// Latitude, longitude and the travel radius are stored but no matching
/// logic reads them yet.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VendorProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub company_name: String,
    pub base_city: String,
    pub base_state: String,
    pub base_zip: String,
    pub base_latitude: Option<f64>,
    pub base_longitude: Option<f64>,
    pub service_states: Vec<String>,
    pub use_radius: bool,
    pub max_travel_radius_miles: Option<i32>,
}

/// Validated vendor profile form data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VendorProfileDraft {
    pub company_name: String,
    pub base_city: String,
    pub base_state: String,
    pub base_zip: String,
    /// Sorted, de-duplicated state codes.
    pub service_states: Vec<String>,
}
