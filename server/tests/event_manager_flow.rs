mod common;

use axum::http::StatusCode;
use serde_json::json;

use bidboard_server::db::Store;
use common::{ids, TestApp};

#[tokio::test]
async fn created_events_start_unpublished_and_toggle_back_and_forth() {
    let app = TestApp::new();
    let manager = app.manager("planner").await;
    let event_id = app.create_event(&manager, "Fresno Gala", "ca").await;

    let event = app.store.find_event(event_id).await.unwrap().unwrap();
    assert!(!event.is_published);
    assert_eq!(event.state, "CA");
    assert_eq!(event.country, "US");

    let uri = format!("/event-manager/event/{event_id}/publish");
    let first = app.post(&uri, Some(&manager), json!({})).await;
    assert_eq!(first.body["message"], "Event published successfully!");
    assert_eq!(first.body["data"]["is_published"], true);

    let second = app.post(&uri, Some(&manager), json!({})).await;
    assert_eq!(second.body["message"], "Event unpublished successfully!");
    assert!(!app.store.find_event(event_id).await.unwrap().unwrap().is_published);
}

#[tokio::test]
async fn dashboard_shows_own_events_newest_first() {
    let app = TestApp::new();
    let alice = app.manager("alice").await;
    let bob = app.manager("bob").await;

    let older = app.create_event(&alice, "Spring Show", "CA").await;
    let _other = app.create_event(&bob, "Bob's Party", "CA").await;
    let newer = app.create_event(&alice, "Summer Show", "NY").await;

    let dashboard = app.get("/event-manager/dashboard", Some(&alice)).await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert_eq!(
        ids(&dashboard.body["data"]["events"]),
        vec![newer.to_string(), older.to_string()]
    );
}

#[tokio::test]
async fn invalid_event_form_reports_fields() {
    let app = TestApp::new();
    let manager = app.manager("planner").await;

    let response = app
        .post(
            "/event-manager/event/create",
            Some(&manager),
            json!({ "title": "", "state": "ZZ", "date": "next tuesday" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields = &response.body["error"]["details"]["fields"];
    assert!(fields["title"].is_array());
    assert!(fields["state"].is_array());
    assert!(fields["date"].is_array());
}

#[tokio::test]
async fn owner_can_edit_their_event() {
    let app = TestApp::new();
    let manager = app.manager("planner").await;
    let event_id = app.create_event(&manager, "Fresno Gala", "CA").await;
    let uri = format!("/event-manager/event/{event_id}/edit");

    let form = app.get(&uri, Some(&manager)).await;
    assert_eq!(form.status, StatusCode::OK);
    assert_eq!(form.body["data"]["form"]["title"], "Fresno Gala");

    let response = app
        .post(
            &uri,
            Some(&manager),
            json!({
                "title": "Fresno Winter Gala",
                "state": "CA",
                "date": "2026-12-05",
                "start_time": "18:30",
                "needs_lighting": true,
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["redirect"], "/event-manager/dashboard");

    let event = app.store.find_event(event_id).await.unwrap().unwrap();
    assert_eq!(event.title, "Fresno Winter Gala");
    assert!(event.needs_lighting);
    assert_eq!(event.date.unwrap().to_string(), "2026-12-05");
}

#[tokio::test]
async fn other_managers_are_forbidden_and_change_nothing() {
    let app = TestApp::new();
    let alice = app.manager("alice").await;
    let mallory = app.manager("mallory").await;
    let event_id = app.create_event(&alice, "Fresno Gala", "CA").await;

    let edit = app
        .post(
            &format!("/event-manager/event/{event_id}/edit"),
            Some(&mallory),
            json!({ "title": "Hijacked", "state": "CA" }),
        )
        .await;
    assert_eq!(edit.status, StatusCode::FORBIDDEN);
    assert_eq!(edit.body["error"]["details"]["redirect"], "/dashboard");

    let publish = app
        .post(
            &format!("/event-manager/event/{event_id}/publish"),
            Some(&mallory),
            json!({}),
        )
        .await;
    assert_eq!(publish.status, StatusCode::FORBIDDEN);

    let bids = app
        .get(&format!("/event-manager/event/{event_id}/bids"), Some(&mallory))
        .await;
    assert_eq!(bids.status, StatusCode::FORBIDDEN);

    let event = app.store.find_event(event_id).await.unwrap().unwrap();
    assert_eq!(event.title, "Fresno Gala");
    assert!(!event.is_published);
}

#[tokio::test]
async fn missing_event_is_not_found() {
    let app = TestApp::new();
    let manager = app.manager("planner").await;

    let response = app
        .get(
            &format!("/event-manager/event/{}/edit", uuid::Uuid::new_v4()),
            Some(&manager),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn owner_reviews_bids_and_strangers_cannot() {
    let app = TestApp::new();
    let alice = app.manager("alice").await;
    let mallory = app.manager("mallory").await;
    let event_id = app.published_event(&alice, "Fresno Gala", "CA").await;

    let (_, first_vendor) = app.vendor("west-av", "West AV", &["CA"]).await;
    let (_, second_vendor) = app.vendor("coastal", "Coastal AV", &["CA"]).await;
    let bid_uri = format!("/vendor/event/{event_id}");
    let first = app
        .post(&bid_uri, Some(&first_vendor), json!({ "message": "First" }))
        .await;
    let second = app
        .post(
            &bid_uri,
            Some(&second_vendor),
            json!({ "message": "Second", "estimated_budget": "2400.50" }),
        )
        .await;
    let first_id = first.body["data"]["id"].as_str().unwrap().to_string();
    let second_id = second.body["data"]["id"].as_str().unwrap().to_string();

    let listing = app
        .get(&format!("/event-manager/event/{event_id}/bids"), Some(&alice))
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    let bids = &listing.body["data"]["bids"];
    assert_eq!(ids(bids), vec![second_id.clone(), first_id]);
    assert_eq!(bids[0]["vendor_company"], "Coastal AV");

    let detail = app
        .get(&format!("/event-manager/bid/{second_id}"), Some(&alice))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["data"]["vendor"]["company_name"], "Coastal AV");
    assert_eq!(detail.body["data"]["event"]["id"], event_id.to_string());

    let denied = app
        .get(&format!("/event-manager/bid/{second_id}"), Some(&mallory))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(
        denied.body["error"]["message"],
        "You do not have permission to view this bid."
    );

    let missing = app
        .get(
            &format!("/event-manager/bid/{}", uuid::Uuid::new_v4()),
            Some(&alice),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}
