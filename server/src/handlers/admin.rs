//! Operator screens: read-only listings with search and filters, plus the
//! one place a bid's status can change.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::StaffAccount;
use crate::db::{BidFilter, EventFilter, ProfileFilter, VendorFilter};
use crate::forms::BidStatusForm;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{submitted, view};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn states(
    State(state): State<AppState>,
    _staff: StaffAccount,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let states = state.store.search_states(query.q.as_deref()).await?;
    Ok(view(states))
}

pub async fn profiles(
    State(state): State<AppState>,
    _staff: StaffAccount,
    Query(filter): Query<ProfileFilter>,
) -> Result<Response, AppError> {
    Ok(view(state.store.search_profiles(&filter).await?))
}

pub async fn vendors(
    State(state): State<AppState>,
    _staff: StaffAccount,
    Query(mut filter): Query<VendorFilter>,
) -> Result<Response, AppError> {
    filter.base_state = filter.base_state.map(|code| code.trim().to_ascii_uppercase());
    Ok(view(state.store.search_vendors(&filter).await?))
}

pub async fn events(
    State(state): State<AppState>,
    _staff: StaffAccount,
    Query(mut filter): Query<EventFilter>,
) -> Result<Response, AppError> {
    filter.state = filter.state.map(|code| code.trim().to_ascii_uppercase());
    Ok(view(state.store.search_events(&filter).await?))
}

pub async fn bids(
    State(state): State<AppState>,
    _staff: StaffAccount,
    Query(filter): Query<BidFilter>,
) -> Result<Response, AppError> {
    Ok(view(state.store.search_bids(&filter).await?))
}

/// Persists a new bid status. Nothing else reacts to the change.
pub async fn set_bid_status(
    State(state): State<AppState>,
    StaffAccount(staff): StaffAccount,
    Path(bid_id): Path<Uuid>,
    Json(form): Json<BidStatusForm>,
) -> Result<Response, AppError> {
    let status = form.clean()?;
    let bid = state.store.set_bid_status(bid_id, status).await?;
    info!(bid_id = %bid.id, status = %bid.status, staff_id = %staff.id, "Bid status changed");

    Ok(submitted(
        StatusCode::OK,
        bid,
        format!("Bid marked {status}."),
        "/admin/bids",
    ))
}
