//! OpenAI-compatible chat-completions client

use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, trace};

use crate::{
    ChatParams, ChatResponse, Provider, ProviderError, Result, ToolCall, ToolChoice, Usage,
};

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Chat-completions provider for OpenAI or any compatible gateway
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    api_base: String,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(
        api_key: impl Into<String>,
        api_base: Option<String>,
        default_model: Option<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            api_base: api_base.unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            default_model: default_model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    fn build_request(&self, params: &ChatParams) -> Value {
        let mut body = json!({
            "model": params.model,
            "messages": params.messages,
            "max_tokens": params.max_tokens,
            "temperature": params.temperature,
        });

        if !params.tools.is_empty() {
            body["tools"] = json!(params.tools);
            body["tool_choice"] = match &params.tool_choice {
                ToolChoice::Auto => json!("auto"),
                ToolChoice::Required(name) => {
                    json!({"type": "function", "function": {"name": name}})
                }
                ToolChoice::None => json!("none"),
            };
            body["parallel_tool_calls"] = json!(params.parallel_tool_calls);
        }

        body
    }

    fn parse_response(&self, payload: Value) -> Result<ChatResponse> {
        let choice = payload["choices"]
            .get(0)
            .ok_or(ProviderError::InvalidResponse)?;
        let message = &choice["message"];

        let content = message["content"].as_str().map(str::to_string);
        let finish_reason = choice["finish_reason"]
            .as_str()
            .unwrap_or("stop")
            .to_string();

        let mut tool_calls = Vec::new();
        if let Some(calls) = message["tool_calls"].as_array() {
            for call in calls {
                let function = &call["function"];
                // Arguments arrive as a JSON-encoded string; some gateways
                // send the object directly.
                let arguments = function["arguments"]
                    .as_str()
                    .and_then(|s| serde_json::from_str(s).ok())
                    .unwrap_or_else(|| function["arguments"].clone());

                tool_calls.push(ToolCall {
                    id: call["id"].as_str().unwrap_or_default().to_string(),
                    name: function["name"].as_str().unwrap_or_default().to_string(),
                    arguments,
                });
            }
        }

        let usage = payload["usage"]
            .as_object()
            .map(|u| Usage {
                prompt_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
                completion_tokens: u
                    .get("completion_tokens")
                    .and_then(Value::as_u64)
                    .unwrap_or(0) as u32,
                total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0) as u32,
            })
            .unwrap_or_default();

        Ok(ChatResponse {
            content,
            tool_calls,
            finish_reason,
            usage,
        })
    }
}

#[async_trait::async_trait]
impl Provider for OpenAiProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let url = format!("{}/chat/completions", self.api_base);
        trace!(%url, model = %params.model, "chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(&params))
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response.json().await?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("unknown error")
                .to_string();
            return Err(ProviderError::Api(message));
        }

        let parsed = self.parse_response(payload)?;
        debug!(
            tool_calls = parsed.tool_calls.len(),
            finish = %parsed.finish_reason,
            "chat completion response"
        );
        Ok(parsed)
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Message, ToolSpec};

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("sk-test", None, None)
    }

    #[test]
    fn defaults_point_at_openai() {
        let p = provider();
        assert_eq!(p.api_base, DEFAULT_API_BASE);
        assert_eq!(p.default_model(), DEFAULT_MODEL);
        assert!(p.is_configured());
    }

    #[test]
    fn custom_base_and_model_are_kept() {
        let p = OpenAiProvider::new(
            "sk-test",
            Some("https://gateway.example.com/v1".to_string()),
            Some("gpt-4o".to_string()),
        );
        assert_eq!(p.api_base, "https://gateway.example.com/v1");
        assert_eq!(p.default_model(), "gpt-4o");
    }

    #[test]
    fn empty_key_is_not_configured() {
        assert!(!OpenAiProvider::new("", None, None).is_configured());
    }

    #[test]
    fn request_without_tools_omits_tool_fields() {
        let params = ChatParams {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message::user("hello")],
            ..Default::default()
        };
        let body = provider().build_request(&params);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert!(body.get("parallel_tool_calls").is_none());
    }

    #[test]
    fn request_with_tools_disables_parallel_calls() {
        let params = ChatParams {
            model: "gpt-4o-mini".to_string(),
            messages: vec![Message::user("find prospects")],
            tools: vec![ToolSpec::new(
                "people_search",
                "Search for people",
                json!({"type": "object"}),
            )],
            ..Default::default()
        };
        let body = provider().build_request(&params);

        assert_eq!(body["tools"][0]["function"]["name"], "people_search");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["parallel_tool_calls"], false);
    }

    #[test]
    fn request_serializes_required_tool_choice() {
        let params = ChatParams {
            tools: vec![ToolSpec::new("people_search", "d", json!({}))],
            tool_choice: ToolChoice::Required("people_search".to_string()),
            ..Default::default()
        };
        let body = provider().build_request(&params);
        assert_eq!(body["tool_choice"]["function"]["name"], "people_search");
    }

    #[test]
    fn parse_plain_text_response() {
        let payload = json!({
            "choices": [{
                "message": {"role": "assistant", "content": "Hi there"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4, "total_tokens": 16}
        });
        let response = provider().parse_response(payload).unwrap();

        assert_eq!(response.content.as_deref(), Some("Hi there"));
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.total_tokens, 16);
    }

    #[test]
    fn parse_tool_call_with_string_arguments() {
        let payload = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "people_search",
                            "arguments": "{\"person_titles\": [\"marketing manager\"]}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response = provider().parse_response(payload).unwrap();

        assert_eq!(response.tool_calls.len(), 1);
        let call = response.first_tool_call().unwrap();
        assert_eq!(call.name, "people_search");
        assert_eq!(
            call.arguments["person_titles"][0],
            json!("marketing manager")
        );
    }

    #[test]
    fn parse_tool_call_with_object_arguments() {
        let payload = json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "id": "call_2",
                        "function": {"name": "company_search", "arguments": {"keywords": "saas"}}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let response = provider().parse_response(payload).unwrap();
        assert_eq!(response.tool_calls[0].arguments["keywords"], "saas");
    }

    #[test]
    fn parse_rejects_missing_choices() {
        let result = provider().parse_response(json!({"usage": {}}));
        assert!(matches!(result, Err(ProviderError::InvalidResponse)));
    }
}
