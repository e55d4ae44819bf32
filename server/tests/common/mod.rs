#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use bidboard_server::config::Config;
use bidboard_server::db::{MemoryStore, Store};
use bidboard_server::models::{NewAccount, Role, VendorProfileDraft};
use bidboard_server::routes::create_routes;
use bidboard_server::AppState;

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::with_reference_states());
        let config = Config::from_lookup(|_| None).expect("default config");
        let state = AppState::new(store.clone(), Duration::hours(1));
        Self {
            router: create_routes(state, &config),
            store,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Creates an account straight in the store and returns a live session
    /// token, skipping password hashing.
    pub async fn account(&self, username: &str, role: Option<Role>) -> (Uuid, String) {
        self.account_with_staff(username, role, false).await
    }

    pub async fn staff(&self, username: &str) -> (Uuid, String) {
        self.account_with_staff(username, None, true).await
    }

    async fn account_with_staff(
        &self,
        username: &str,
        role: Option<Role>,
        is_staff: bool,
    ) -> (Uuid, String) {
        let account = self
            .store
            .create_account(
                NewAccount {
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    password_hash: "unused".to_string(),
                    is_staff,
                },
                role,
            )
            .await
            .expect("account created");
        let session = self
            .store
            .create_session(account.id, Duration::hours(1))
            .await
            .expect("session created");
        (account.id, session.token)
    }

    pub async fn manager(&self, username: &str) -> String {
        self.account(username, Some(Role::EventManager)).await.1
    }

    /// Vendor account with a saved profile serving `states`.
    pub async fn vendor(&self, username: &str, company: &str, states: &[&str]) -> (Uuid, String) {
        let (account_id, token) = self.account(username, Some(Role::Vendor)).await;
        let vendor = self
            .store
            .upsert_vendor_profile(
                account_id,
                VendorProfileDraft {
                    company_name: company.to_string(),
                    service_states: states.iter().map(|code| code.to_string()).collect(),
                    ..VendorProfileDraft::default()
                },
            )
            .await
            .expect("vendor profile");
        (vendor.id, token)
    }

    pub async fn create_event(&self, token: &str, title: &str, state: &str) -> Uuid {
        let response = self
            .post(
                "/event-manager/event/create",
                Some(token),
                json!({ "title": title, "city": "Anytown", "state": state, "needs_sound": true }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("event id")
    }

    pub async fn publish(&self, token: &str, event_id: Uuid) {
        let response = self
            .post(
                &format!("/event-manager/event/{event_id}/publish"),
                Some(token),
                json!({}),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    pub async fn published_event(&self, token: &str, title: &str, state: &str) -> Uuid {
        let event_id = self.create_event(token, title, state).await;
        self.publish(token, event_id).await;
        event_id
    }
}

pub fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}
