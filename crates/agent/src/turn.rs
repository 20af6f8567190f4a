//! One turn of tool-augmented conversation
//!
//! The control loop alternates between a decision node (model call) and an
//! execution node (capability call) until the model answers without a
//! pending tool request, or requests a capability the host owns. Within a
//! turn everything is sequential: the model call, the remote capability
//! call, and every observer emission are awaited in order, so an observer
//! sees a monotonically growing progress log.

use std::sync::Arc;
use tracing::{debug, info, warn};

use ebisu_apollo::{ApolloClient, PeopleSearchParams};
use ebisu_config::Config;
use ebisu_provider::{
    ChatParams, Message, Provider, ToolCall, ToolCallRecord, ToolChoice,
};
use ebisu_state::{AgentState, ProgressEntry, StateDelta, StateSink};
use ebisu_unipile::UnipileClient;

use crate::host::HostAction;
use crate::tools::{self, ToolRegistry};
use crate::{prompt, AgentError, Result};

/// Status shown before the first model call of a session
const READY_STATUS: &str = "Ready to help you find prospects";

/// Capabilities the execution node knows by name
///
/// Dispatch is over this closed set; anything unknown falls through to the
/// generic registry handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    PeopleSearch,
    OrganizationSearch,
    OrganizationJobPostings,
    PeopleEnrichment,
    OrganizationEnrichment,
    CompanyProfile,
    CompanySearch,
    SendMessage,
    Unknown,
}

impl Capability {
    pub fn from_name(name: &str) -> Self {
        match name {
            tools::PEOPLE_SEARCH => Self::PeopleSearch,
            tools::ORGANIZATION_SEARCH => Self::OrganizationSearch,
            tools::ORGANIZATION_JOB_POSTINGS => Self::OrganizationJobPostings,
            tools::PEOPLE_ENRICHMENT => Self::PeopleEnrichment,
            tools::ORGANIZATION_ENRICHMENT => Self::OrganizationEnrichment,
            tools::COMPANY_PROFILE => Self::CompanyProfile,
            tools::COMPANY_SEARCH => Self::CompanySearch,
            tools::SEND_MESSAGE => Self::SendMessage,
            _ => Self::Unknown,
        }
    }
}

/// Result of a completed turn
#[derive(Debug)]
pub struct TurnOutcome {
    pub state: AgentState,
    /// Set when the model requested a host-owned action; the host resolves
    /// it outside this core.
    pub pending_action: Option<ToolCall>,
}

/// What the decision node chose for the next transition
enum Decision {
    /// Plain response; the turn ends
    Respond(StateDelta),
    /// Tool request matching a host action; the turn ends, host resolves it
    Defer { delta: StateDelta, call: ToolCall },
    /// Tool request the agent executes itself
    Invoke { delta: StateDelta, call: ToolCall },
}

/// Control-loop phase
enum Phase {
    Deciding,
    Executing(ToolCall),
    Terminated,
}

/// The conversational research agent
///
/// Owns the tool registry and the capability clients; the state it operates
/// on is passed through [`ResearchAgent::run_turn`] and returned updated.
pub struct ResearchAgent<P: Provider> {
    provider: Arc<P>,
    apollo: Arc<ApolloClient>,
    tools: ToolRegistry,
    sink: Arc<dyn StateSink>,
    host_actions: Vec<HostAction>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    language: String,
    max_tool_rounds: u32,
}

impl<P: Provider> ResearchAgent<P> {
    /// Create an agent with the default tool set
    pub fn with_config(
        provider: P,
        apollo: Arc<ApolloClient>,
        unipile: Arc<UnipileClient>,
        sink: Arc<dyn StateSink>,
        config: &Config,
    ) -> Self {
        let mut tools = ToolRegistry::new();
        tools::register_default_tools(&mut tools, apollo.clone(), unipile);

        Self {
            provider: Arc::new(provider),
            apollo,
            tools,
            sink,
            host_actions: Vec::new(),
            model: config.model.model.clone(),
            max_tokens: config.model.max_tokens,
            temperature: config.model.temperature,
            language: config.agent.language.clone(),
            max_tool_rounds: config.agent.max_tool_rounds,
        }
    }

    /// Replace the host-action descriptors bound to the model
    pub fn set_host_actions(&mut self, actions: Vec<HostAction>) {
        self.host_actions = actions;
    }

    /// Register an additional tool
    pub fn register_tool<T: crate::Tool + 'static>(&mut self, tool: T) {
        self.tools.register(tool);
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.names()
    }

    /// Run one turn to completion
    ///
    /// The state is owned by this call for the duration of the turn. On
    /// failure the error is returned and the partially-updated state is
    /// dropped; the host keeps whatever snapshot it had, plus anything the
    /// sink already delivered.
    pub async fn run_turn(&self, mut state: AgentState) -> Result<TurnOutcome> {
        let mut phase = Phase::Deciding;
        let mut rounds: u32 = 0;

        loop {
            phase = match phase {
                Phase::Deciding => match self.decide(&state).await? {
                    Decision::Respond(delta) => {
                        delta.apply(&mut state);
                        Phase::Terminated
                    }
                    Decision::Defer { delta, call } => {
                        debug!(action = %call.name, "deferring to host action");
                        delta.apply(&mut state);
                        return Ok(TurnOutcome {
                            state,
                            pending_action: Some(call),
                        });
                    }
                    Decision::Invoke { delta, call } => {
                        delta.apply(&mut state);
                        rounds += 1;
                        if rounds > self.max_tool_rounds {
                            return Err(AgentError::MaxToolRounds(self.max_tool_rounds));
                        }
                        Phase::Executing(call)
                    }
                },
                // Execution always hands control back to the decision node;
                // a failure aborts the whole turn instead of looping.
                Phase::Executing(call) => {
                    let delta = self.execute(&state, &call).await?;
                    delta.apply(&mut state);
                    Phase::Deciding
                }
                Phase::Terminated => {
                    return Ok(TurnOutcome {
                        state,
                        pending_action: None,
                    });
                }
            };
        }
    }

    /// Decision node: query the model and pick the next transition
    async fn decide(&self, state: &AgentState) -> Result<Decision> {
        // A subscriber always observes at least one snapshot, even for
        // turns that resolve immediately.
        if state.logs.is_empty() {
            let mut baseline = state.clone();
            baseline.current_status = READY_STATUS.to_string();
            self.sink.emit(baseline).await;
        }

        let mut messages = Vec::with_capacity(state.messages.len() + 1);
        messages.push(Message::system(prompt::system_prompt(
            &self.language,
            &self.tools.names(),
        )));
        messages.extend(state.messages.iter().cloned());

        let mut specs = self.tools.specs();
        specs.extend(self.host_actions.iter().map(HostAction::spec));

        let params = ChatParams {
            model: self.model.clone(),
            messages,
            tools: specs,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            tool_choice: ToolChoice::Auto,
            parallel_tool_calls: false,
        };

        let response = self.provider.chat(params).await?;

        // At most one invocation per decision; anything past the first is
        // ignored even if a provider disregards the parallel-calls setting.
        match response.first_tool_call() {
            Some(call) => {
                let call = call.clone();
                let delta = StateDelta::new().push_message(Message::assistant_tool_call(
                    response.content.as_deref(),
                    ToolCallRecord::from(&call),
                ));

                if self.host_actions.iter().any(|a| a.matches(&call.name)) {
                    Ok(Decision::Defer { delta, call })
                } else {
                    Ok(Decision::Invoke { delta, call })
                }
            }
            None => {
                let content = response
                    .content
                    .unwrap_or_else(|| "Done.".to_string());
                Ok(Decision::Respond(
                    StateDelta::new().push_message(Message::assistant(content)),
                ))
            }
        }
    }

    /// Execution node: run the pending capability and fold results into a delta
    async fn execute(&self, state: &AgentState, call: &ToolCall) -> Result<StateDelta> {
        match Capability::from_name(&call.name) {
            Capability::PeopleSearch => self.run_people_search(state, call).await,
            _ => {
                debug!(tool = %call.name, "executing tool");
                let result = self.tools.execute(&call.name, call.arguments.clone()).await?;
                Ok(StateDelta::new().push_message(Message::tool_result(
                    &call.id,
                    &call.name,
                    result,
                )))
            }
        }
    }

    /// The people-search protocol: log, emit, call, log, emit
    ///
    /// Exactly four log entries on success. The "Searching..." assistant
    /// message is transient: it appears in emitted snapshots only, never in
    /// the canonical state.
    async fn run_people_search(
        &self,
        state: &AgentState,
        call: &ToolCall,
    ) -> Result<StateDelta> {
        let mut scratch = state.clone();
        let mut delta = StateDelta::new();

        let start = ProgressEntry::progress("🔍 Starting people search...");
        scratch.logs.push(start.clone());
        delta.logs.push(start);
        scratch.current_status = "Searching for people...".to_string();

        let mut announce = scratch.clone();
        announce
            .messages
            .push(Message::assistant("*Searching for people...* 🕵️"));
        self.sink.emit(announce).await;

        // Mid-flight checkpoint before the remote call; the observer sees
        // this even when the provider takes seconds to answer.
        let executing = ProgressEntry::progress("⚡ Executing Apollo people search API...");
        scratch.logs.push(executing.clone());
        delta.logs.push(executing);
        scratch.current_status = "Executing search...".to_string();
        self.sink.emit(scratch.clone()).await;

        let params: PeopleSearchParams = serde_json::from_value(call.arguments.clone())
            .map_err(|e| AgentError::InvalidArguments(e.to_string()))?;

        let people = match self.apollo.people_search(params).await {
            Ok(people) => people,
            Err(e) => {
                // Failure stays visible to observers, then propagates; the
                // canonical state and the last results are left untouched.
                warn!(error = %e, "people search failed");
                scratch
                    .logs
                    .push(ProgressEntry::error(format!("❌ People search failed: {}", e)));
                scratch.current_status = "Search failed".to_string();
                self.sink.emit(scratch).await;
                return Err(e.into());
            }
        };

        let found = people.len();
        info!(count = found, "people search succeeded");

        let success = ProgressEntry::success(format!("✅ Found {} people successfully!", found));
        scratch.logs.push(success.clone());
        delta.logs.push(success);

        let processing = ProgressEntry::progress("🔄 Processing and formatting results...");
        scratch.logs.push(processing.clone());
        delta.logs.push(processing);

        let closing = Message::assistant(format!("Found {} people. ✅", found));
        scratch.people = people.clone();
        scratch.current_status = format!("Search completed - {} people found", found);
        scratch.messages.push(closing.clone());
        self.sink.emit(scratch).await;

        delta.messages.push(closing);
        delta.messages.push(Message::tool_result(
            &call.id,
            &call.name,
            format!("Found {} people.", found),
        ));
        delta.people = Some(people);
        delta.status = Some(format!("Ready - {} people loaded", found));

        Ok(delta)
    }
}
