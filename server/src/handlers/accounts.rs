//! Registration, login and logout.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::auth::{hash_password, verify_password, CurrentAccount};
use crate::db::StoreError;
use crate::forms::account::{invalid_login, DUPLICATE_USERNAME};
use crate::forms::{FieldErrors, LoginForm, RegistrationForm};
use crate::models::{Account, NewAccount, Role};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{empty_success, submitted, view};

#[derive(Serialize)]
struct FormView {
    action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    fields: &'static [&'static str],
}

#[derive(Serialize)]
pub struct SessionPayload {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: Account,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

const REGISTRATION_FIELDS: &[&str] = &["username", "email", "password1", "password2"];

pub async fn register_vendor_form() -> Response {
    view(FormView {
        action: "/register/vendor",
        role: Some(Role::Vendor),
        fields: REGISTRATION_FIELDS,
    })
}

pub async fn register_event_manager_form() -> Response {
    view(FormView {
        action: "/register/event-manager",
        role: Some(Role::EventManager),
        fields: REGISTRATION_FIELDS,
    })
}

pub async fn register_vendor(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<Response, AppError> {
    let session = register(&state, &form, Role::Vendor).await?;
    Ok(submitted(
        StatusCode::CREATED,
        session,
        "Registration successful! Please complete your vendor profile.",
        "/vendor/profile",
    ))
}

pub async fn register_event_manager(
    State(state): State<AppState>,
    Json(form): Json<RegistrationForm>,
) -> Result<Response, AppError> {
    let session = register(&state, &form, Role::EventManager).await?;
    Ok(submitted(
        StatusCode::CREATED,
        session,
        "Registration successful!",
        Role::EventManager.dashboard_path(),
    ))
}

/// Creates account and role profile together, then signs the new account in.
/// The role comes from the endpoint, never from the submitted form.
async fn register(
    state: &AppState,
    form: &RegistrationForm,
    role: Role,
) -> Result<SessionPayload, AppError> {
    let valid = form.clean()?;

    if state
        .store
        .find_account_by_username(&valid.username)
        .await?
        .is_some()
    {
        return Err(FieldErrors::single("username", DUPLICATE_USERNAME).into());
    }

    let password = valid.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|err| AppError::InternalServerError(err.to_string()))?
        .map_err(|err| AppError::InternalServerError(err.to_string()))?;

    let new_account = NewAccount {
        username: valid.username,
        email: valid.email,
        password_hash,
        is_staff: false,
    };
    let account = match state.store.create_account(new_account, Some(role)).await {
        Ok(account) => account,
        // Lost a race with a concurrent registration of the same name.
        Err(StoreError::Conflict(_)) => {
            return Err(FieldErrors::single("username", DUPLICATE_USERNAME).into())
        }
        Err(err) => return Err(err.into()),
    };

    info!(account_id = %account.id, username = %account.username, role = %role, "Account registered");
    start_session(state, account, Some(role)).await
}

async fn start_session(
    state: &AppState,
    account: Account,
    role: Option<Role>,
) -> Result<SessionPayload, AppError> {
    let session = state
        .store
        .create_session(account.id, state.session_ttl)
        .await?;
    Ok(SessionPayload {
        token: session.token,
        expires_at: session.expires_at,
        account,
        role,
    })
}

pub async fn login_form() -> Response {
    view(FormView {
        action: "/login",
        role: None,
        fields: &["username", "password"],
    })
}

pub async fn login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Response, AppError> {
    let (username, password) = form.clean()?;

    let account = state
        .store
        .find_account_by_username(username)
        .await?
        .ok_or_else(invalid_login)?;

    let password = password.to_string();
    let hash = account.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|err| AppError::InternalServerError(err.to_string()))?;
    if !verified {
        return Err(invalid_login().into());
    }

    let role = state
        .store
        .profile_for(account.id)
        .await?
        .map(|profile| profile.role);
    info!(account_id = %account.id, "Login succeeded");

    let session = start_session(&state, account, role).await?;
    Ok(submitted(StatusCode::OK, session, "Logged in.", "/dashboard"))
}

/// Ends the presented session, if any. Always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    current: Option<CurrentAccount>,
) -> Result<Response, AppError> {
    if let Some(current) = current {
        state.store.delete_session(&current.token).await?;
        info!(account_id = %current.account.id, "Session ended");
    }
    Ok(empty_success("Logged out.", "/"))
}
