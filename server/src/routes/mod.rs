use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    accounts, admin, dashboard, event_manager, health_check, home, vendor,
};
use crate::state::AppState;

/// All application routes, without the outer middleware.
pub fn app_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/login", get(accounts::login_form).post(accounts::login))
        .route("/logout", get(accounts::logout).post(accounts::logout))
        .route(
            "/register/vendor",
            get(accounts::register_vendor_form).post(accounts::register_vendor),
        )
        .route(
            "/register/event-manager",
            get(accounts::register_event_manager_form).post(accounts::register_event_manager),
        )
        .route("/dashboard", get(dashboard::dashboard))
        .route("/vendor/dashboard", get(vendor::dashboard))
        .route(
            "/vendor/profile",
            get(vendor::profile_form).post(vendor::save_profile),
        )
        .route(
            "/vendor/event/:id",
            get(vendor::event_detail).post(vendor::submit_bid),
        )
        .route("/event-manager/dashboard", get(event_manager::dashboard))
        .route(
            "/event-manager/event/create",
            get(event_manager::create_form).post(event_manager::create_event),
        )
        .route(
            "/event-manager/event/:id/edit",
            get(event_manager::edit_form).post(event_manager::edit_event),
        )
        .route(
            "/event-manager/event/:id/publish",
            post(event_manager::toggle_publish),
        )
        .route("/event-manager/event/:id/bids", get(event_manager::event_bids))
        .route("/event-manager/bid/:id", get(event_manager::bid_detail))
        .route("/admin/states", get(admin::states))
        .route("/admin/profiles", get(admin::profiles))
        .route("/admin/vendors", get(admin::vendors))
        .route("/admin/events", get(admin::events))
        .route("/admin/bids", get(admin::bids))
        .route("/admin/bids/:id/status", post(admin::set_bid_status))
        .with_state(state)
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    app_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(config.cors_allowed_origins.as_deref()))
}
