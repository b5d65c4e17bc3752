use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChatError;

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/chat";

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a `{"message"}` → `{"response"}` chat endpoint
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post one message and return the server's reply text.
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        debug!(endpoint = %self.endpoint, chars = message.chars().count(), "sending chat message");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ChatRequest { message })
            .send()
            .await
            .map_err(ChatError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            // The backend reports failures as {"error": "..."}
            let detail = response
                .text()
                .await
                .ok()
                .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
                .map(|body| body.error);
            warn!(%status, detail = detail.as_deref().unwrap_or(""), "chat request rejected");
            return Err(ChatError::Status { status, detail });
        }

        let chat_response: ChatResponse = response.json().await.map_err(ChatError::Decode)?;
        debug!(chars = chat_response.response.chars().count(), "received chat response");
        Ok(chat_response.response)
    }

    /// Check whether the server behind the endpoint is up.
    ///
    /// Hits the root of the endpoint's host, which answers a plain GET.
    pub async fn ping(&self) -> bool {
        let Some(url) = root_url(&self.endpoint) else {
            warn!(endpoint = %self.endpoint, "endpoint is not a valid URL");
            return false;
        };

        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "ping failed");
                false
            }
        }
    }
}

fn root_url(endpoint: &str) -> Option<Url> {
    let mut url = Url::parse(endpoint).ok()?;
    url.set_path("/");
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}
