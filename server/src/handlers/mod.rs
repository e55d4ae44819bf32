use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::utils::response::success;

pub mod accounts;
pub mod admin;
pub mod dashboard;
pub mod event_manager;
pub mod vendor;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Response {
    let payload = HealthPayload {
        status: "ok",
        service: "bidboard-api",
    };

    success(payload, "Health check successful").into_response()
}

#[derive(Serialize)]
struct LandingPayload {
    register_vendor: &'static str,
    register_event_manager: &'static str,
    login: &'static str,
    dashboard: &'static str,
}

/// Public landing page.
pub async fn home() -> Response {
    let payload = LandingPayload {
        register_vendor: "/register/vendor",
        register_event_manager: "/register/event-manager",
        login: "/login",
        dashboard: "/dashboard",
    };

    success(payload, "Find vendors for your next event").into_response()
}
