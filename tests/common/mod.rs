//! Shared harness: a server on an ephemeral port backed by the in-memory
//! store, plus token helpers.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use serde_json::{Value, json};

use freelance_hub::app_state::AppState;
use freelance_hub::auth::{Claims, TokenVerifier};
use freelance_hub::build_app;
use freelance_hub::config::HubConfig;
use freelance_hub::domain::UserRole;
use freelance_hub::persistence::{MarketStore, MemoryStore};

pub const SECRET: &str = "integration-secret";

pub struct TestServer {
    pub addr: SocketAddr,
    pub http: reqwest::Client,
    tokens: TokenVerifier,
}

impl TestServer {
    pub async fn start() -> Self {
        let mut config = HubConfig::for_tests(SECRET);
        config.upload_dir = std::env::temp_dir().join(format!("hub-test-{}", uuid::Uuid::new_v4()));
        let store: Arc<dyn MarketStore> = Arc::new(MemoryStore::new());
        let app = build_app(AppState::new(store, &config));

        let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
            panic!("bind failed");
        };
        let Ok(addr) = listener.local_addr() else {
            panic!("no local addr");
        };
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            http: reqwest::Client::new(),
            tokens: TokenVerifier::new(SECRET),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn token(&self, user: &str, role: UserRole) -> String {
        let claims = Claims::new(user, Duration::hours(1))
            .with_role(role)
            .with_email(format!("{user}@example.com"));
        let Ok(token) = self.tokens.issue(&claims) else {
            panic!("issue failed");
        };
        token
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> (u16, Value) {
        let mut req = self.http.get(self.url(path));
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        Self::finish(req).await
    }

    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
        body: Value,
    ) -> (u16, Value) {
        let req = self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .json(&body);
        Self::finish(req).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> (u16, Value) {
        self.send(reqwest::Method::POST, path, token, body).await
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> (u16, Value) {
        self.send(reqwest::Method::PATCH, path, token, body).await
    }

    async fn finish(req: reqwest::RequestBuilder) -> (u16, Value) {
        let Ok(resp) = req.send().await else {
            panic!("request failed");
        };
        let status = resp.status().as_u16();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    /// Creates a listing for `seller` and returns its id.
    pub async fn listing(&self, seller_token: &str, title: &str, price: &str) -> String {
        let (status, body) = self
            .post(
                "/api/services",
                seller_token,
                json!({
                    "title": title,
                    "description": format!("{title}, delivered fast"),
                    "price": price,
                    "deliveryTime": 3,
                    "category": "design"
                }),
            )
            .await;
        assert_eq!(status, 201, "{body}");
        str_field(&body, "id")
    }

    /// Places an order by `buyer` and returns its id.
    pub async fn order(&self, buyer_token: &str, service_id: &str) -> String {
        let (status, body) = self
            .post("/api/orders", buyer_token, json!({ "serviceId": service_id }))
            .await;
        assert_eq!(status, 201, "{body}");
        str_field(&body, "id")
    }
}

pub fn str_field(body: &Value, key: &str) -> String {
    let Some(value) = body.get(key).and_then(Value::as_str) else {
        panic!("missing {key} in {body}");
    };
    value.to_string()
}

pub fn error_code(body: &Value) -> Option<u64> {
    body.get("error")?.get("code")?.as_u64()
}
