#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use talearc_api::auth::PasswordHasher;
use talearc_api::config::AppConfig;
use talearc_api::database::repository::RegistrationKeyRepository;
use talearc_api::database::Store;
use talearc_api::services::ChapterContentStore;
use talearc_api::testing::MemoryStore;
use talearc_api::{router, AppState};

pub const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// One in-process application over a store and a fresh content dir
pub struct TestApp {
    pub router: Router,
    pub store: Arc<dyn Store>,
    pub prefix: String,
    memory: Option<Arc<MemoryStore>>,
    content_dir: TempDir,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl Response {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> i64 {
        self.body["data"]["id"].as_i64().unwrap_or_default()
    }
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let mut config = AppConfig::development();
        config.security.jwt_secret = JWT_SECRET.to_string();
        Self::with_config(config).await
    }

    pub async fn with_config(config: AppConfig) -> Result<Self> {
        let memory = Arc::new(MemoryStore::new());
        let store: Arc<dyn Store> = memory.clone();
        Self::with_store(config, store, Some(memory)).await
    }

    /// Application over any store; `memory` is kept for fault switches
    pub async fn with_store(
        mut config: AppConfig,
        store: Arc<dyn Store>,
        memory: Option<Arc<MemoryStore>>,
    ) -> Result<Self> {
        let content_dir = TempDir::new().context("creating content dir")?;
        config.storage.content_base_path = content_dir.path().to_path_buf();

        let content = Arc::new(ChapterContentStore::open(content_dir.path()).await?);
        let prefix = config.server.api_prefix.clone();

        let state = AppState::with_hasher(
            Arc::new(config),
            store.clone(),
            content,
            PasswordHasher::with_iterations(1_000, 4),
        )?;

        Ok(Self {
            router: router(state),
            store,
            prefix,
            memory,
            content_dir,
        })
    }

    /// The backing memory store; only apps built by `spawn`/`with_config` have one
    pub fn memory(&self) -> &MemoryStore {
        self.memory.as_deref().expect("app is not backed by the memory store")
    }

    pub fn content_root(&self) -> PathBuf {
        self.content_dir.path().to_path_buf()
    }

    /// Every `*.txt` chapter body currently on disk
    pub fn content_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &std::path::Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, out);
                } else if path.extension().is_some_and(|e| e == "txt") {
                    out.push(path);
                }
            }
        }
        let mut out = Vec::new();
        walk(self.content_dir.path(), &mut out);
        out
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<Response> {
        let uri = if path.starts_with("/health") || path == "/" {
            path.to_string()
        } else {
            format!("{}{}", self.prefix, path)
        };

        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok(Response { status, body })
    }

    pub async fn get(&self, path: &str, token: &str) -> Result<Response> {
        self.request(Method::GET, path, Some(token), None).await
    }

    pub async fn post(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        self.request(Method::POST, path, Some(token), Some(body)).await
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> Result<Response> {
        self.request(Method::PUT, path, Some(token), Some(body)).await
    }

    pub async fn delete(&self, path: &str, token: &str) -> Result<Response> {
        self.request(Method::DELETE, path, Some(token), None).await
    }

    pub async fn add_key(&self, key: &str) -> Result<()> {
        self.store.insert_registration_key(key).await?;
        Ok(())
    }

    pub async fn register(&self, name: &str, password: &str, key: &str) -> Result<Response> {
        self.request(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "name": name, "password": password, "registrationKey": key })),
        )
        .await
    }

    pub async fn login(&self, name: &str, password: &str) -> Result<Response> {
        self.request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "name": name, "password": password })),
        )
        .await
    }

    /// Registers `name` with a fresh key and returns a bearer token
    pub async fn user(&self, name: &str) -> Result<String> {
        let key = format!("KEY-{}", name);
        self.add_key(&key).await?;
        let registered = self.register(name, "correct horse", &key).await?;
        anyhow::ensure!(
            registered.status == StatusCode::OK,
            "register {} failed: {}",
            name,
            registered.body
        );

        let login = self.login(name, "correct horse").await?;
        login.body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login returned no token")
    }

    pub async fn world_view(&self, token: &str, name: &str) -> Result<i64> {
        let created = self.post("/worldviews", token, json!({ "name": name })).await?;
        anyhow::ensure!(created.status == StatusCode::CREATED, "{}", created.body);
        Ok(created.id())
    }

    pub async fn character(&self, token: &str, world_view_id: i64, name: &str) -> Result<i64> {
        let created = self
            .post(
                "/characters",
                token,
                json!({ "worldViewId": world_view_id, "name": name }),
            )
            .await?;
        anyhow::ensure!(created.status == StatusCode::CREATED, "{}", created.body);
        Ok(created.id())
    }

    pub async fn novel(&self, token: &str, world_view_id: i64, title: &str) -> Result<i64> {
        let created = self
            .post(
                "/novels",
                token,
                json!({ "worldViewId": world_view_id, "title": title }),
            )
            .await?;
        anyhow::ensure!(created.status == StatusCode::CREATED, "{}", created.body);
        Ok(created.id())
    }
}
