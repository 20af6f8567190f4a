//! Research agent core
//!
//! Drives one turn of tool-augmented conversation: a decision node queries
//! the language model, an execution node runs the requested capability while
//! streaming progress snapshots, and the control loop cycles between them
//! until the model answers without a pending tool call.

use thiserror::Error;

pub mod host;
pub mod prompt;
pub mod tools;
pub mod turn;

pub use host::HostAction;
pub use tools::{Tool, ToolRegistry};
pub use turn::{Capability, ResearchAgent, TurnOutcome};

/// Failures that abort the current turn
///
/// Nothing here is retried; retry policy belongs to the host.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("model provider error: {0}")]
    Provider(#[from] ebisu_provider::ProviderError),

    #[error("people search failed: {0}")]
    Search(#[from] ebisu_apollo::ApolloError),

    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("tool execution failed: {0}")]
    Tool(String),

    #[error("invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("exceeded {0} tool rounds in one turn")]
    MaxToolRounds(u32),
}

pub type Result<T> = std::result::Result<T, AgentError>;
