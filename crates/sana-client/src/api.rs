use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The gateway as seen from the client: one exchange call plus the two
/// history reads. Kept as a trait so the view-model can be exercised
/// without a network.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    async fn exchange(&self, session_id: &str, message: &str) -> Result<ExchangeReply>;
    async fn history(&self, session_id: &str) -> Result<Vec<TurnSnapshot>>;
    async fn sessions(&self) -> Result<Vec<SessionEntry>>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangeReply {
    pub response: String,
    pub symptom: Option<String>,
    pub advice: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TurnSnapshot {
    pub role: String,
    pub content: String,
    pub timestamp_ms: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionEntry {
    pub session_id: String,
    pub created_at_ms: i64,
    pub message_count: i64,
    pub last_message: Option<String>,
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    session_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    messages: Vec<TurnSnapshot>,
}

#[derive(Debug, Deserialize)]
struct SessionsResponse {
    sessions: Vec<SessionEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let detail = match resp.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => status.to_string(),
        };
        Err(Error::Status {
            code: status.as_u16(),
            detail,
        })
    }
}

#[async_trait]
impl ExchangeApi for HttpApi {
    async fn exchange(&self, session_id: &str, message: &str) -> Result<ExchangeReply> {
        let url = format!("{}/api/chat/symptom-check", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.bearer_token)
            .json(&ChatRequest {
                message,
                session_id,
            })
            .send()
            .await?;

        Ok(Self::check(resp).await?.json::<ExchangeReply>().await?)
    }

    async fn history(&self, session_id: &str) -> Result<Vec<TurnSnapshot>> {
        let url = format!("{}/api/chat/history/{}", self.base_url, session_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let body = Self::check(resp).await?.json::<HistoryResponse>().await?;
        Ok(body.messages)
    }

    async fn sessions(&self) -> Result<Vec<SessionEntry>> {
        let url = format!("{}/api/chat/sessions", self.base_url);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await?;

        let body = Self::check(resp).await?.json::<SessionsResponse>().await?;
        Ok(body.sessions)
    }
}
