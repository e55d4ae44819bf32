//! Vendor-facing pages: profile, matching events, and bidding.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::CurrentAccount;
use crate::db::StoreError;
use crate::forms::{BidForm, VendorProfileForm};
use crate::models::{Event, EventBid, GeoState, VendorProfile};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{see_other, submitted, view};

const PROFILE_PATH: &str = "/vendor/profile";
const DASHBOARD_PATH: &str = "/vendor/dashboard";

#[derive(Serialize)]
struct VendorDashboard {
    vendor_profile: VendorProfile,
    events: Vec<Event>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Response, AppError> {
    let Some(vendor_profile) = state.store.vendor_profile_for(current.account.id).await? else {
        info!(account_id = %current.account.id, "Vendor profile missing, sending to profile edit");
        return Ok(see_other(PROFILE_PATH));
    };

    let events = state.store.matching_events(vendor_profile.id).await?;
    Ok(view(VendorDashboard {
        vendor_profile,
        events,
    }))
}

#[derive(Serialize)]
struct ProfileFormView {
    form: VendorProfileForm,
    is_new: bool,
    states: Vec<GeoState>,
}

pub async fn profile_form(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Response, AppError> {
    let existing = state.store.vendor_profile_for(current.account.id).await?;
    let states = state.store.list_states().await?;
    Ok(view(ProfileFormView {
        form: existing
            .as_ref()
            .map(VendorProfileForm::from_profile)
            .unwrap_or_default(),
        is_new: existing.is_none(),
        states,
    }))
}

pub async fn save_profile(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(form): Json<VendorProfileForm>,
) -> Result<Response, AppError> {
    let states = state.store.list_states().await?;
    let draft = form.clean(&states)?;

    let profile = state
        .store
        .upsert_vendor_profile(current.account.id, draft)
        .await?;
    info!(
        account_id = %current.account.id,
        vendor_id = %profile.id,
        service_states = ?profile.service_states,
        "Vendor profile saved"
    );

    Ok(submitted(
        StatusCode::OK,
        profile,
        "Profile updated successfully!",
        DASHBOARD_PATH,
    ))
}

#[derive(Serialize)]
struct EventDetail {
    event: Event,
    vendor_profile: Option<VendorProfile>,
    existing_bid: Option<EventBid>,
    can_bid: bool,
}

/// Loads an event through the public scope: unpublished events do not exist here.
async fn published_event(state: &AppState, event_id: Uuid) -> Result<Event, AppError> {
    state
        .store
        .find_event(event_id)
        .await?
        .filter(|event| event.is_published)
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
}

pub async fn event_detail(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = published_event(&state, event_id).await?;
    let vendor_profile = state.store.vendor_profile_for(current.account.id).await?;
    let existing_bid = match &vendor_profile {
        Some(vendor) => state.store.bid_for(event.id, vendor.id).await?,
        None => None,
    };

    let can_bid = vendor_profile.is_some() && existing_bid.is_none();
    Ok(view(EventDetail {
        event,
        vendor_profile,
        existing_bid,
        can_bid,
    }))
}

/// Submits a bid. The first bid per (event, vendor) wins; later attempts
/// are conflicts and never update the stored bid.
pub async fn submit_bid(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(event_id): Path<Uuid>,
    Json(form): Json<BidForm>,
) -> Result<Response, AppError> {
    let event = published_event(&state, event_id).await?;
    let Some(vendor) = state.store.vendor_profile_for(current.account.id).await? else {
        return Ok(see_other(PROFILE_PATH));
    };

    let draft = form.clean()?;
    let bid = match state.store.create_bid(event.id, vendor.id, draft).await {
        Ok(bid) => bid,
        Err(StoreError::Conflict(_)) => {
            warn!(event_id = %event.id, vendor_id = %vendor.id, "Duplicate bid rejected");
            return Err(AppError::Conflict(
                "You have already submitted a bid for this event.".to_string(),
            ));
        }
        Err(err) => return Err(err.into()),
    };

    info!(bid_id = %bid.id, event_id = %event.id, vendor_id = %vendor.id, "Bid submitted");
    Ok(submitted(
        StatusCode::CREATED,
        bid,
        "Bid submitted successfully!",
        DASHBOARD_PATH,
    ))
}
