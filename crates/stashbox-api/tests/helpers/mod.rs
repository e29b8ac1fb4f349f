//! Shared test helpers for API integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use stashbox_api::{AppState, build_app};
use stashbox_core::config::{
    AppConfig, AuthConfig, DatabaseConfig, LoggingConfig, ServerConfig, TreeConfig,
};
use stashbox_database::MemoryNodeRepository;
use stashbox_service::FileTreeService;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for direct inspection
    pub repo: MemoryNodeRepository,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub fn new() -> Self {
        Self::with_tree(TreeConfig::default())
    }

    /// Create a test application with custom tree rules
    pub fn with_tree(tree: TreeConfig) -> Self {
        let config = AppConfig {
            server: ServerConfig::default(),
            database: DatabaseConfig::in_memory(),
            auth: AuthConfig::default(),
            tree,
            logging: LoggingConfig::default(),
        };

        let repo = MemoryNodeRepository::new();
        let service = FileTreeService::new(Arc::new(repo.clone()), config.tree.clone());
        let state = AppState::new(Arc::new(config), Arc::new(service));

        Self {
            router: build_app(state),
            repo,
        }
    }

    /// Send a request as `user` (anonymous when `None`)
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        user: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(user) = user {
            req = req.header("x-user-id", user);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Create a folder and return its id
    pub async fn folder(&self, user: &str, name: &str, parent_id: Option<&str>) -> String {
        let response = self
            .request(
                "POST",
                "/api/folders",
                Some(serde_json::json!({ "name": name, "parent_id": parent_id })),
                Some(user),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }

    /// Upload metadata for a file and return its id
    pub async fn file(&self, user: &str, name: &str, parent_id: Option<&str>) -> String {
        let response = self
            .request(
                "POST",
                "/api/files",
                Some(serde_json::json!({
                    "name": name,
                    "path": format!("/uploads/{name}"),
                    "size": 2048,
                    "type": "image/png",
                    "file_url": format!("https://cdn.example.com/{name}"),
                    "parent_id": parent_id,
                })),
                Some(user),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.id()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `data.id` of a single-node response
    pub fn id(&self) -> String {
        self.body["data"]["id"]
            .as_str()
            .expect("response has no data.id")
            .to_string()
    }

    /// `data[*].id` of a listing response
    pub fn ids(&self) -> Vec<String> {
        self.body["data"]
            .as_array()
            .expect("response data is not a list")
            .iter()
            .filter_map(|n| n["id"].as_str().map(String::from))
            .collect()
    }

    /// `error` code of a failure response
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
