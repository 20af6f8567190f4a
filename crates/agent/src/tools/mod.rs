//! Tool trait and registry

pub mod apollo;
pub mod unipile;

pub use apollo::{
    JobPostingsTool, OrganizationEnrichmentTool, OrganizationSearchTool, PeopleEnrichmentTool,
    PeopleSearchTool,
};
pub use unipile::{CompanyProfileTool, CompanySearchTool, SendMessageTool};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use ebisu_apollo::ApolloClient;
use ebisu_provider::ToolSpec;
use ebisu_unipile::UnipileClient;

use crate::{AgentError, Result};

/// Capability identifiers known to the execution node
pub const PEOPLE_SEARCH: &str = "people_search";
pub const ORGANIZATION_SEARCH: &str = "organization_search";
pub const ORGANIZATION_JOB_POSTINGS: &str = "organization_job_postings";
pub const PEOPLE_ENRICHMENT: &str = "people_enrichment";
pub const ORGANIZATION_ENRICHMENT: &str = "organization_enrichment";
pub const COMPANY_PROFILE: &str = "company_profile";
pub const COMPANY_SEARCH: &str = "company_search";
pub const SEND_MESSAGE: &str = "send_message";

type BoxedTool = Box<dyn Tool>;

/// An executable capability bound to the model
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object
    fn parameters(&self) -> Value;
    async fn execute(&self, args: Value)
        -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>>;
}

/// Named collection of tools the agent may execute
pub struct ToolRegistry {
    tools: HashMap<String, BoxedTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Wire descriptors for every registered tool
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.tools
            .values()
            .map(|t| ToolSpec::new(t.name(), t.description(), t.parameters()))
            .collect()
    }

    /// Execute one tool by name; failures are never downgraded to output
    pub async fn execute(&self, name: &str, args: Value) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))?;
        tool.execute(args)
            .await
            .map_err(|e| AgentError::Tool(e.to_string()))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the standard capability set
pub fn register_default_tools(
    registry: &mut ToolRegistry,
    apollo: Arc<ApolloClient>,
    unipile: Arc<UnipileClient>,
) {
    registry.register(PeopleSearchTool::new(apollo.clone()));
    registry.register(OrganizationSearchTool::new(apollo.clone()));
    registry.register(JobPostingsTool::new(apollo.clone()));
    registry.register(PeopleEnrichmentTool::new(apollo.clone()));
    registry.register(OrganizationEnrichmentTool::new(apollo));

    registry.register(CompanyProfileTool::new(unipile.clone()));
    registry.register(CompanySearchTool::new(unipile.clone()));
    registry.register(SendMessageTool::new(unipile));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echo the input"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
        async fn execute(
            &self,
            args: Value,
        ) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Ok(args["text"].as_str().unwrap_or_default().to_string())
        }
    }

    struct FailingTool;

    #[async_trait]
    impl Tool for FailingTool {
        fn name(&self) -> &str {
            "broken"
        }
        fn description(&self) -> &str {
            "Always fails"
        }
        fn parameters(&self) -> Value {
            json!({"type": "object"})
        }
        async fn execute(
            &self,
            _args: Value,
        ) -> std::result::Result<String, Box<dyn std::error::Error + Send + Sync>> {
            Err("deliberate failure".into())
        }
    }

    #[tokio::test]
    async fn registry_executes_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert!(registry.has("echo"));
        let out = registry
            .execute("echo", json!({"text": "hello"}))
            .await
            .unwrap();
        assert_eq!(out, "hello");
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error() {
        let registry = ToolRegistry::new();
        let err = registry.execute("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn tool_failures_are_not_swallowed() {
        let mut registry = ToolRegistry::new();
        registry.register(FailingTool);

        let err = registry.execute("broken", json!({})).await.unwrap_err();
        assert!(matches!(err, AgentError::Tool(msg) if msg.contains("deliberate failure")));
    }

    #[test]
    fn specs_expose_every_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        registry.register(FailingTool);

        let specs = registry.specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(registry.names(), vec!["broken", "echo"]);
    }
}
