use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::models::Account;
use crate::state::AppState;
use crate::utils::error::AppError;

/// The account behind a live bearer session. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account: Account,
    pub token: String,
}

/// A [`CurrentAccount`] whose account is flagged as staff. Rejects with 403.
#[derive(Debug, Clone)]
pub struct StaffAccount(pub Account);

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or_else(|| {
            AppError::AuthError("Authentication credentials were not provided.".to_string())
        })?;

        let account = state
            .store
            .session_account(token)
            .await?
            .ok_or_else(|| AppError::AuthError("Session is invalid or has expired.".to_string()))?;

        Ok(CurrentAccount {
            account,
            token: token.to_string(),
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for StaffAccount {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentAccount { account, .. } = CurrentAccount::from_request_parts(parts, state).await?;
        if !account.is_staff {
            return Err(AppError::Forbidden(
                "Staff access is required for this page.".to_string(),
            ));
        }
        Ok(StaffAccount(account))
    }
}
