//! Persistence boundary.
//!
//! Handlers talk to an [`Store`] trait object so the same routes run against
//! Postgres in production and the in-process [`MemoryStore`] in tests. Each
//! method is one all-or-nothing unit of work.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use crate::models::{
    Account, BidDraft, BidStatus, Event, EventBid, EventDraft, GeoState, NewAccount, Profile,
    Role, Session, VendorProfile, VendorProfileDraft,
};

pub mod listing;
pub mod memory;
pub mod postgres;

pub use listing::{
    BidFilter, BidListing, EventFilter, EventListing, ProfileFilter, ProfileListing, VendorFilter,
    VendorListing,
};
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("database error")]
    Database(#[source] sqlx::Error),

    #[error("migration failed")]
    Migration(#[source] sqlx::migrate::MigrateError),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let constraint = db_err.constraint().unwrap_or("unique").to_string();
                return StoreError::Conflict(constraint);
            }
        }
        StoreError::Database(err)
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts missing reference states; existing codes are left untouched.
    async fn seed_states(&self, states: &[(&str, &str)]) -> Result<(), StoreError>;
    /// All reference states ordered by name.
    async fn list_states(&self) -> Result<Vec<GeoState>, StoreError>;

    /// Creates the account and, when given, its role profile in one unit.
    /// A case-insensitive username clash yields [`StoreError::Conflict`].
    async fn create_account(
        &self,
        account: NewAccount,
        role: Option<Role>,
    ) -> Result<Account, StoreError>;
    async fn find_account_by_username(&self, username: &str)
        -> Result<Option<Account>, StoreError>;
    async fn profile_for(&self, account_id: Uuid) -> Result<Option<Profile>, StoreError>;

    async fn create_session(&self, account_id: Uuid, ttl: Duration)
        -> Result<Session, StoreError>;
    /// Resolves a live session token to its account. Expired tokens resolve to `None`.
    async fn session_account(&self, token: &str) -> Result<Option<Account>, StoreError>;
    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;

    async fn vendor_profile_for(
        &self,
        account_id: Uuid,
    ) -> Result<Option<VendorProfile>, StoreError>;
    async fn find_vendor_profile(&self, id: Uuid) -> Result<Option<VendorProfile>, StoreError>;
    /// Creates or replaces the account's vendor profile, service states included.
    async fn upsert_vendor_profile(
        &self,
        account_id: Uuid,
        draft: VendorProfileDraft,
    ) -> Result<VendorProfile, StoreError>;

    async fn create_event(&self, owner: Uuid, draft: EventDraft) -> Result<Event, StoreError>;
    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, StoreError>;
    async fn update_event(&self, id: Uuid, draft: EventDraft) -> Result<Event, StoreError>;
    /// Flips `is_published` atomically and returns the new row.
    async fn toggle_event_published(&self, id: Uuid) -> Result<Event, StoreError>;
    /// Events owned by `owner`, newest first.
    async fn events_created_by(&self, owner: Uuid) -> Result<Vec<Event>, StoreError>;
    /// Published events located in one of the vendor's service states, newest first.
    async fn matching_events(&self, vendor_id: Uuid) -> Result<Vec<Event>, StoreError>;

    /// Inserts a bid. A second bid for the same (event, vendor) pair yields
    /// [`StoreError::Conflict`] and leaves the first one untouched.
    async fn create_bid(
        &self,
        event_id: Uuid,
        vendor_id: Uuid,
        draft: BidDraft,
    ) -> Result<EventBid, StoreError>;
    async fn find_bid(&self, id: Uuid) -> Result<Option<EventBid>, StoreError>;
    async fn bid_for(&self, event_id: Uuid, vendor_id: Uuid)
        -> Result<Option<EventBid>, StoreError>;
    /// Bids on one event, newest first.
    async fn bids_for_event(&self, event_id: Uuid) -> Result<Vec<BidListing>, StoreError>;
    async fn set_bid_status(&self, id: Uuid, status: BidStatus) -> Result<EventBid, StoreError>;

    async fn search_states(&self, q: Option<&str>) -> Result<Vec<GeoState>, StoreError>;
    async fn search_profiles(
        &self,
        filter: &ProfileFilter,
    ) -> Result<Vec<ProfileListing>, StoreError>;
    async fn search_vendors(&self, filter: &VendorFilter)
        -> Result<Vec<VendorListing>, StoreError>;
    async fn search_events(&self, filter: &EventFilter) -> Result<Vec<EventListing>, StoreError>;
    async fn search_bids(&self, filter: &BidFilter) -> Result<Vec<BidListing>, StoreError>;
}

/// Normalizes an operator search term: blank means no search.
pub(crate) fn search_term(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
}
