//! Unipile-backed tools

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;

use ebisu_unipile::UnipileClient;

use super::{Tool, COMPANY_PROFILE, COMPANY_SEARCH, SEND_MESSAGE};

type ToolOutput = std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;

/// LinkedIn company profile lookup
pub struct CompanyProfileTool {
    client: Arc<UnipileClient>,
}

impl CompanyProfileTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CompanyProfileTool {
    fn name(&self) -> &str {
        COMPANY_PROFILE
    }

    fn description(&self) -> &str {
        "Get details about a LinkedIn company by its public identifier, e.g. \"linkedin\"."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "identifier": { "type": "string", "description": "LinkedIn company identifier" }
            },
            "required": ["identifier"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let identifier = args["identifier"].as_str().unwrap_or_default();
        let profile = self.client.company_profile(identifier).await?;
        Ok(serde_json::to_string(&profile)?)
    }
}

/// LinkedIn company keyword search
pub struct CompanySearchTool {
    client: Arc<UnipileClient>,
}

impl CompanySearchTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for CompanySearchTool {
    fn name(&self) -> &str {
        COMPANY_SEARCH
    }

    fn description(&self) -> &str {
        "Search for LinkedIn companies by keywords."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "keywords": { "type": "string", "description": "Search keywords" },
                "limit": { "type": "integer", "minimum": 1, "maximum": 50 }
            },
            "required": ["keywords"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let keywords = args["keywords"].as_str().unwrap_or_default();
        let limit = args["limit"].as_u64().map(|l| l as u32);
        let hits = self.client.search_companies(keywords, limit).await?;
        Ok(serde_json::to_string(&hits)?)
    }
}

/// Send a LinkedIn message
///
/// Sends into an existing chat when `chat_id` is given, otherwise opens a
/// new chat with `recipient_id`.
pub struct SendMessageTool {
    client: Arc<UnipileClient>,
}

impl SendMessageTool {
    pub fn new(client: Arc<UnipileClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for SendMessageTool {
    fn name(&self) -> &str {
        SEND_MESSAGE
    }

    fn description(&self) -> &str {
        "Send a LinkedIn message. Provide chat_id to continue an existing chat, or \
         recipient_id to start a new one."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "chat_id": { "type": "string", "description": "Existing chat to send into" },
                "recipient_id": { "type": "string", "description": "LinkedIn user provider id for a new chat" },
                "content": { "type": "string", "description": "Message text" }
            },
            "required": ["content"]
        })
    }

    async fn execute(&self, args: Value) -> ToolOutput {
        let content = args["content"].as_str().unwrap_or_default();

        let receipt = if let Some(chat_id) = args["chat_id"].as_str().filter(|c| !c.is_empty()) {
            self.client.send_message(chat_id, content).await?
        } else {
            let recipient = args["recipient_id"].as_str().unwrap_or_default();
            self.client.create_chat(recipient, content).await?
        };

        Ok(serde_json::to_string(&receipt)?)
    }
}
