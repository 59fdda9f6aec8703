//! HTTP client for communicating with taskcal-server

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::process::Command;
use std::time::Duration;
use tracing::debug;
use url::Url;

use taskcal_core::protocol::{ErrorResponse, MessageResponse};
use taskcal_core::{Task, TaskDraft};

const MAX_RETRIES: u32 = 10;
const RETRY_DELAY_MS: u64 = 200;

/// HTTP client for taskcal-server
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Connect to the configured server, starting a local one if none is running
    pub async fn connect(server_url: &str) -> Result<Self> {
        let client = Self {
            http: reqwest::Client::new(),
            base_url: server_url.trim_end_matches('/').to_string(),
        };

        // Try to connect to existing server
        if client.health_check().await.is_ok() {
            return Ok(client);
        }

        if !is_local(&client.base_url) {
            anyhow::bail!("Could not reach taskcal-server at {}", client.base_url);
        }

        // Server not running - start it
        start_server()?;

        // Wait for server to be ready
        for _ in 0..MAX_RETRIES {
            tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
            if client.health_check().await.is_ok() {
                return Ok(client);
            }
        }

        anyhow::bail!("Failed to connect to taskcal-server after starting it")
    }

    async fn health_check(&self) -> Result<()> {
        self.http
            .get(self.url("/tasks"))
            .timeout(Duration::from_secs(2))
            .send()
            .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /tasks
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let resp = self
            .http
            .get(self.url("/tasks"))
            .send()
            .await
            .context("Failed to connect to server")?;

        parse_response(resp).await
    }

    /// POST /tasks
    pub async fn create_task(&self, draft: &TaskDraft) -> Result<Task> {
        let resp = self
            .http
            .post(self.url("/tasks"))
            .json(draft)
            .send()
            .await
            .context("Failed to connect to server")?;

        parse_response(resp).await
    }

    /// PUT /tasks/:id
    pub async fn update_task(&self, id: i64, draft: &TaskDraft) -> Result<Task> {
        let resp = self
            .http
            .put(self.url(&format!("/tasks/{id}")))
            .json(draft)
            .send()
            .await
            .context("Failed to connect to server")?;

        parse_response(resp).await
    }

    /// DELETE /tasks/:id
    pub async fn delete_task(&self, id: i64) -> Result<MessageResponse> {
        let resp = self
            .http
            .delete(self.url(&format!("/tasks/{id}")))
            .send()
            .await
            .context("Failed to connect to server")?;

        parse_response(resp).await
    }

    /// PATCH /tasks/:id/complete
    pub async fn complete_task(&self, id: i64) -> Result<Task> {
        let resp = self
            .http
            .patch(self.url(&format!("/tasks/{id}/complete")))
            .send()
            .await
            .context("Failed to connect to server")?;

        parse_response(resp).await
    }

    /// GET /events - the open reminder stream; read it with `Response::chunk`
    pub async fn subscribe(&self) -> Result<reqwest::Response> {
        let resp = self
            .http
            .get(self.url("/events"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .context("Failed to connect to server")?;

        if !resp.status().is_success() {
            anyhow::bail!("Server refused reminder subscription: {}", resp.status());
        }
        Ok(resp)
    }
}

async fn parse_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
    let status = resp.status();
    if !status.is_success() {
        let err: ErrorResponse = resp
            .json()
            .await
            .with_context(|| format!("Server returned {status}"))?;
        anyhow::bail!("{}", err.error);
    }

    Ok(resp.json().await?)
}

fn is_local(base_url: &str) -> bool {
    Url::parse(base_url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_owned))
        .is_some_and(|host| matches!(host.as_str(), "127.0.0.1" | "localhost" | "[::1]"))
}

/// Start the taskcal-server process
fn start_server() -> Result<()> {
    debug!("Starting taskcal-server");
    Command::new("taskcal-server")
        .spawn()
        .context("Failed to start taskcal-server. Is it installed?")?;
    Ok(())
}
