use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    /// Page the client should show next after a form submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub success: bool,
    pub error: ApiErrorBody,
}

pub fn success<T>(data: T, message: impl Into<String>) -> impl IntoResponse
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
        redirect: None,
    };
    (StatusCode::OK, Json(body))
}

/// Read-only page payload.
pub fn view<T>(data: T) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: None,
        redirect: None,
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Outcome of an accepted form: the flash notice plus where to go next.
pub fn submitted<T>(
    status: StatusCode,
    data: T,
    message: impl Into<String>,
    redirect: impl Into<String>,
) -> Response
where
    T: Serialize,
{
    let body = ApiResponse {
        success: true,
        data: Some(data),
        message: Some(message.into()),
        redirect: Some(redirect.into()),
    };
    (status, Json(body)).into_response()
}

pub fn empty_success(message: impl Into<String>, redirect: impl Into<String>) -> Response {
    let body: ApiResponse<()> = ApiResponse {
        success: true,
        data: None,
        message: Some(message.into()),
        redirect: Some(redirect.into()),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Plain navigation answered with `303 See Other`.
pub fn see_other(location: &str) -> Response {
    Redirect::to(location).into_response()
}

pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Value>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        success: false,
        error: ApiErrorBody {
            code: code.to_string(),
            message: message.into(),
            details,
        },
    };

    (status, Json(body)).into_response()
}
