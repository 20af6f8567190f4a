//! Unipile LinkedIn gateway client
//!
//! Company lookup and messaging through a Unipile instance. Required
//! parameters are validated before any network call; missing configuration
//! surfaces on first use.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use ebisu_config::UnipileConfig;

#[derive(Error, Debug)]
pub enum UnipileError {
    #[error("UNIPILE_DNS is not configured")]
    MissingDsn,

    #[error("UNIPILE_API_KEY is not configured")]
    MissingApiKey,

    #[error("UNIPILE_ACCOUNT_ID is not configured")]
    MissingAccountId,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Non-2xx gateway response: status code, raw body, human message
    #[error("{message} (status {status})")]
    Api {
        status: u16,
        body: String,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, UnipileError>;

/// A LinkedIn company profile, cleaned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub founded_year: Option<i64>,
    /// "City, Country" of the headquarters location when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headquarters: Option<String>,
}

/// One company search result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyHit {
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Acknowledgement of a sent message or created chat
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendReceipt {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// Unipile REST client
pub struct UnipileClient {
    http: Client,
    dsn: Option<String>,
    api_key: Option<String>,
    account_id: Option<String>,
}

impl UnipileClient {
    pub fn new(config: &UnipileConfig) -> Self {
        Self {
            http: Client::new(),
            dsn: config.dsn.clone(),
            api_key: config.api_key.clone(),
            account_id: config.account_id.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        set(&self.dsn) && set(&self.api_key) && set(&self.account_id)
    }

    /// Instance base URL; bare hostnames gain an https prefix
    fn base_url(&self) -> Result<String> {
        let dsn = self
            .dsn
            .as_deref()
            .filter(|d| !d.is_empty())
            .ok_or(UnipileError::MissingDsn)?;
        if dsn.starts_with("http") {
            Ok(dsn.trim_end_matches('/').to_string())
        } else {
            Ok(format!("https://{}", dsn))
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(UnipileError::MissingApiKey)
    }

    fn account_id(&self) -> Result<&str> {
        self.account_id
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or(UnipileError::MissingAccountId)
    }

    async fn request(
        &self,
        builder: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Value> {
        let response = builder
            .header("accept", "application/json")
            .header("X-API-KEY", self.api_key()?)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UnipileError::Api {
                status: status.as_u16(),
                body,
                message: context.to_string(),
            });
        }
        Ok(response.json().await?)
    }

    /// Details about a LinkedIn company
    pub async fn company_profile(&self, identifier: &str) -> Result<CompanyProfile> {
        if identifier.is_empty() {
            return Err(UnipileError::InvalidParams(
                "company identifier is required".to_string(),
            ));
        }

        let url = format!(
            "{}/api/v1/linkedin/company/{}?account_id={}",
            self.base_url()?,
            identifier,
            self.account_id()?
        );
        let payload = self
            .request(self.http.get(&url), "Failed to fetch company profile")
            .await?;

        Ok(clean_company_profile(&payload))
    }

    /// Keyword search for LinkedIn companies
    pub async fn search_companies(
        &self,
        keywords: &str,
        limit: Option<u32>,
    ) -> Result<Vec<CompanyHit>> {
        if keywords.is_empty() {
            return Err(UnipileError::InvalidParams(
                "search keywords are required".to_string(),
            ));
        }

        let account_id = self.account_id()?.to_string();
        let url = format!(
            "{}/api/v1/linkedin/search?account_id={}",
            self.base_url()?,
            account_id
        );
        let body = json!({
            "api": "classic",
            "category": "companies",
            "keywords": keywords,
            "account_id": account_id,
            "limit": limit.unwrap_or(10),
        });

        let payload = self
            .request(
                self.http.post(&url).json(&body),
                "Failed to search companies",
            )
            .await?;

        let hits: Vec<CompanyHit> = match payload.get("items") {
            Some(Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())?,
        };
        debug!(count = hits.len(), "company search returned");
        Ok(hits)
    }

    /// Open a new chat with a LinkedIn user
    pub async fn create_chat(&self, recipient_id: &str, text: &str) -> Result<SendReceipt> {
        if recipient_id.is_empty() {
            return Err(UnipileError::InvalidParams(
                "recipient id is required".to_string(),
            ));
        }
        if text.is_empty() {
            return Err(UnipileError::InvalidParams(
                "message text is required".to_string(),
            ));
        }

        let account_id = self.account_id()?.to_string();
        let url = format!("{}/api/v1/chats", self.base_url()?);
        let body = json!({
            "account_id": account_id,
            "attendees_ids": [recipient_id],
            "text": text,
        });

        let payload = self
            .request(self.http.post(&url).json(&body), "Failed to create chat")
            .await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Send a message in an existing chat
    pub async fn send_message(&self, chat_id: &str, content: &str) -> Result<SendReceipt> {
        if chat_id.is_empty() {
            return Err(UnipileError::InvalidParams(
                "chat id is required".to_string(),
            ));
        }
        if content.is_empty() {
            return Err(UnipileError::InvalidParams(
                "message content is required".to_string(),
            ));
        }

        let account_id = self.account_id()?.to_string();
        let url = format!("{}/api/v1/chats/{}/messages", self.base_url()?, chat_id);
        let body = json!({
            "account_id": account_id,
            "content": content,
            "type": "text",
        });

        let payload = self
            .request(self.http.post(&url).json(&body), "Failed to send message")
            .await?;
        Ok(serde_json::from_value(payload)?)
    }
}

/// Reduce a raw company payload to the fields the agent reports
fn clean_company_profile(payload: &Value) -> CompanyProfile {
    let headquarters = payload["locations"].as_array().and_then(|locations| {
        locations
            .iter()
            .find(|l| l["is_headquarter"].as_bool().unwrap_or(false))
            .or_else(|| locations.first())
            .map(|l| {
                let city = l["city"].as_str().unwrap_or_default();
                let country = l["country"].as_str().unwrap_or_default();
                match (city.is_empty(), country.is_empty()) {
                    (false, false) => format!("{}, {}", city, country),
                    (false, true) => city.to_string(),
                    _ => country.to_string(),
                }
            })
            .filter(|hq| !hq.is_empty())
    });

    CompanyProfile {
        name: payload["name"].as_str().map(str::to_string),
        description: payload["description"].as_str().map(str::to_string),
        website: payload["website"].as_str().map(str::to_string),
        industry: payload["industry"].as_array().map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        }),
        employee_count: payload["employee_count"].as_u64(),
        founded_year: payload["founded_year"].as_i64(),
        headquarters,
    }
}
