use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use floki_api::config::AppConfig;
use floki_api::database::MemoryStore;
use floki_api::server;
use floki_api::state::AppState;

/// Real listener on a free port over a fresh in-memory store. Stopped on drop.
pub struct TestServer {
    pub base_url: String,
    pub client: reqwest::Client,
    #[allow(dead_code)]
    pub store: Arc<MemoryStore>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(AppConfig::for_tests(), store.clone())?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind {port}"))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = server::serve(listener, state).await {
                eprintln!("test server stopped: {e}");
            }
        });

        let client = reqwest::Client::builder().no_proxy().build()?;
        let server = Self {
            base_url,
            client,
            store,
            handle,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register an account and return a bearer token for it.
    #[allow(dead_code)]
    pub async fn register_and_login(&self, email: &str, password: &str) -> Result<String> {
        let res = self
            .client
            .post(self.url("/users"))
            .json(&json!({ "name": "Ragnar", "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let res = self
            .client
            .post(self.url("/sessions/password"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
