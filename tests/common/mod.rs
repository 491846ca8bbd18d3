#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use gym_api::auth::TokenService;
use gym_api::config::AppConfig;
use gym_api::database::MemoryStorage;
use gym_api::{app, AppState};

pub const TEST_SECRET: &str = "test-secret";
pub const TOKEN_HEADER: &str = "x-jwt-token";

/// In-process server on its own port, backed by `MemoryStorage`
pub struct TestApp {
    pub base_url: String,
    pub client: reqwest::Client,
    pub storage: Arc<MemoryStorage>,
    pub tokens: Arc<TokenService>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.security.jwt_secret = TEST_SECRET.to_string();
    // Lowest cost bcrypt accepts, keeps account tests fast
    config.security.bcrypt_cost = 4;
    config.api.enable_request_logging = false;
    config
}

pub async fn spawn_app() -> Result<TestApp> {
    let config = test_config();
    let storage = Arc::new(MemoryStorage::new(config.security.bcrypt_cost));
    let state = AppState::new(storage.clone(), config);
    let tokens = state.tokens.clone();

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("failed to bind port {}", port))?;

    let router = app(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let test_app = TestApp {
        base_url: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        storage,
        tokens,
    };
    test_app.wait_ready(Duration::from_secs(5)).await?;
    Ok(test_app)
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/healthcheck")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    /// Creates a gym through the API and returns its `data` object
    pub async fn create_gym(&self, name: &str, description: &str) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/gyms"))
            .json(&json!({ "name": name, "description": description }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create gym: {}", res.status());
        let body: Value = res.json().await?;
        Ok(body["data"].clone())
    }

    /// Signs up and returns `(account_id, token)`
    pub async fn create_account(&self, user_name: &str, password: &str) -> Result<(i64, String)> {
        let res = self
            .client
            .post(self.url("/accounts"))
            .json(&json!({ "userName": user_name, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create account: {}", res.status());
        let body: Value = res.json().await?;

        let id = body["data"]["account"]["id"]
            .as_i64()
            .context("account id missing")?;
        let token = body["data"]["token"]
            .as_str()
            .context("token missing")?
            .to_string();
        Ok((id, token))
    }

    pub async fn login(&self, user_name: &str, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .client
            .get(self.url("/login"))
            .json(&json!({ "username": user_name, "password": password }))
            .send()
            .await?)
    }

    pub async fn post_rating(
        &self,
        gym_id: i64,
        token: Option<&str>,
        body: Value,
    ) -> Result<reqwest::Response> {
        let mut req = self
            .client
            .post(self.url(&format!("/gyms/{}/ratings", gym_id)))
            .json(&body);
        if let Some(token) = token {
            req = req.header(TOKEN_HEADER, token);
        }
        Ok(req.send().await?)
    }
}
