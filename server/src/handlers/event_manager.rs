//! Event-manager pages. Every per-event action is limited to the event's creator.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::CurrentAccount;
use crate::db::BidListing;
use crate::forms::EventForm;
use crate::models::{Event, EventBid, GeoState, VendorProfile};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{submitted, view};

const DASHBOARD_PATH: &str = "/event-manager/dashboard";

#[derive(Serialize)]
struct ManagerDashboard {
    events: Vec<Event>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Response, AppError> {
    let events = state.store.events_created_by(current.account.id).await?;
    Ok(view(ManagerDashboard { events }))
}

/// Fetches an event the caller owns. Missing events are 404, other
/// people's events are 403.
async fn owned_event(
    state: &AppState,
    current: &CurrentAccount,
    event_id: Uuid,
) -> Result<Event, AppError> {
    let event = state
        .store
        .find_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    if !event.is_owned_by(current.account.id) {
        warn!(
            event_id = %event.id,
            account_id = %current.account.id,
            "Non-owner attempted to manage event"
        );
        return Err(AppError::Forbidden(
            "You do not have permission to manage this event.".to_string(),
        ));
    }
    Ok(event)
}

#[derive(Serialize)]
struct EventFormView {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    event: Option<Event>,
    form: EventForm,
    states: Vec<GeoState>,
}

pub async fn create_form(
    State(state): State<AppState>,
    _current: CurrentAccount,
) -> Result<Response, AppError> {
    let states = state.store.list_states().await?;
    Ok(view(EventFormView {
        action: "Create",
        event: None,
        form: EventForm::default(),
        states,
    }))
}

pub async fn create_event(
    State(state): State<AppState>,
    current: CurrentAccount,
    Json(form): Json<EventForm>,
) -> Result<Response, AppError> {
    let states = state.store.list_states().await?;
    let draft = form.clean(&states)?;

    let event = state.store.create_event(current.account.id, draft).await?;
    info!(event_id = %event.id, account_id = %current.account.id, "Event created");

    Ok(submitted(
        StatusCode::CREATED,
        event,
        "Event created successfully!",
        DASHBOARD_PATH,
    ))
}

pub async fn edit_form(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = owned_event(&state, &current, event_id).await?;
    let states = state.store.list_states().await?;
    Ok(view(EventFormView {
        action: "Edit",
        form: EventForm::from_event(&event),
        event: Some(event),
        states,
    }))
}

pub async fn edit_event(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(event_id): Path<Uuid>,
    Json(form): Json<EventForm>,
) -> Result<Response, AppError> {
    let event = owned_event(&state, &current, event_id).await?;
    let states = state.store.list_states().await?;
    let draft = form.clean(&states)?;

    let event = state.store.update_event(event.id, draft).await?;
    info!(event_id = %event.id, "Event updated");

    Ok(submitted(
        StatusCode::OK,
        event,
        "Event updated successfully!",
        DASHBOARD_PATH,
    ))
}

/// Flips the published flag; calling it again reverses the change.
pub async fn toggle_publish(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = owned_event(&state, &current, event_id).await?;
    let event = state.store.toggle_event_published(event.id).await?;
    info!(event_id = %event.id, is_published = event.is_published, "Event publication toggled");

    let message = format!("Event {} successfully!", event.publication_label());
    Ok(submitted(StatusCode::OK, event, message, DASHBOARD_PATH))
}

#[derive(Serialize)]
struct EventBids {
    event: Event,
    bids: Vec<BidListing>,
}

pub async fn event_bids(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = owned_event(&state, &current, event_id).await?;
    let bids = state.store.bids_for_event(event.id).await?;
    Ok(view(EventBids { event, bids }))
}

#[derive(Serialize)]
struct BidDetail {
    bid: EventBid,
    event: Event,
    vendor: Option<VendorProfile>,
}

pub async fn bid_detail(
    State(state): State<AppState>,
    current: CurrentAccount,
    Path(bid_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let bid = state
        .store
        .find_bid(bid_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))?;

    let event = state
        .store
        .find_event(bid.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Bid not found".to_string()))?;
    if !event.is_owned_by(current.account.id) {
        warn!(bid_id = %bid.id, account_id = %current.account.id, "Non-owner attempted to view bid");
        return Err(AppError::Forbidden(
            "You do not have permission to view this bid.".to_string(),
        ));
    }

    let vendor = state.store.find_vendor_profile(bid.vendor_id).await?;
    Ok(view(BidDetail { bid, event, vendor }))
}
