pub mod account;
pub mod bid;
pub mod event;
pub mod session;
pub mod state;
pub mod vendor;

pub use account::{Account, NewAccount, Profile, Role};
pub use bid::{BidDraft, BidStatus, EventBid};
pub use event::{Event, EventDraft};
pub use session::Session;
pub use state::{GeoState, US_STATES};
pub use vendor::{VendorProfile, VendorProfileDraft};

/// Raised when a persisted text column holds a value outside its closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
