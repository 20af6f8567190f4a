//! Host-owned actions
//!
//! Capabilities the embedding application executes itself. The decision node
//! binds them to the model alongside the agent's own tools, but a request for
//! one ends the turn and hands the pending call back to the host.

use serde_json::Value;

use ebisu_provider::ToolSpec;

/// Descriptor of a capability resolved outside the agent
#[derive(Debug, Clone)]
pub struct HostAction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl HostAction {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }

    /// Wire descriptor bound to the model
    pub fn spec(&self) -> ToolSpec {
        ToolSpec::new(&self.name, &self.description, self.parameters.clone())
    }

    /// Matching is by exact name equality
    pub fn matches(&self, tool_name: &str) -> bool {
        self.name == tool_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matching_is_exact() {
        let action = HostAction::new("open_crm", "Open a CRM record", json!({"type": "object"}));
        assert!(action.matches("open_crm"));
        assert!(!action.matches("open_crm_record"));
        assert!(!action.matches("OPEN_CRM"));
    }

    #[test]
    fn spec_carries_the_schema() {
        let action = HostAction::new("open_crm", "Open a CRM record", json!({"type": "object"}));
        let spec = action.spec();
        assert_eq!(spec.function.name, "open_crm");
        assert_eq!(spec.function.parameters, json!({"type": "object"}));
    }
}
