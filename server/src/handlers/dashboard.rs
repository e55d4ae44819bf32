use axum::extract::State;
use axum::response::Response;

use crate::auth::CurrentAccount;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::see_other;

/// Sends the caller to the dashboard for their role, or home when the
/// account has no role profile (e.g. staff created from the command line).
pub async fn dashboard(
    State(state): State<AppState>,
    current: CurrentAccount,
) -> Result<Response, AppError> {
    let profile = state.store.profile_for(current.account.id).await?;
    let location = profile
        .map(|profile| profile.role.dashboard_path())
        .unwrap_or("/");
    Ok(see_other(location))
}
