//! Control-loop integration tests
//!
//! The model is scripted, the Apollo endpoint is mocked; everything else is
//! the real pipeline.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use ebisu_agent::{AgentError, HostAction, ResearchAgent};
use ebisu_apollo::{ApolloClient, ApolloError};
use ebisu_config::{ApolloConfig, Config, UnipileConfig};
use ebisu_provider::{ChatParams, ChatResponse, Provider, ProviderError, ToolCall};
use ebisu_state::{AgentState, LogKind, MemorySink};
use ebisu_unipile::UnipileClient;

/// Replays a fixed sequence of model responses and records what it was asked
struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<ChatResponse, ProviderError>>>,
    seen: Arc<Mutex<Vec<ChatParams>>>,
}

impl ScriptedProvider {
    fn new(responses: Vec<Result<ChatResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn replies(responses: Vec<ChatResponse>) -> Self {
        Self::new(responses.into_iter().map(Ok).collect())
    }

    /// Handle onto the recorded requests, usable after the agent takes
    /// ownership of the provider
    fn recorder(&self) -> Arc<Mutex<Vec<ChatParams>>> {
        self.seen.clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn chat(&self, params: ChatParams) -> Result<ChatResponse, ProviderError> {
        self.seen.lock().unwrap().push(params);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("provider script exhausted")
    }

    fn default_model(&self) -> String {
        "scripted".to_string()
    }

    fn is_configured(&self) -> bool {
        true
    }
}

fn search_call(id: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: "people_search".to_string(),
        arguments: json!({
            "person_titles": ["marketing manager"],
            "person_locations": ["Austin, TX"],
            "q_keywords": "SaaS"
        }),
    }
}

fn two_people_body() -> String {
    json!({
        "people": [
            {
                "first_name": "Ada", "last_name": "Lovelace",
                "email": "email_not_unlocked@domain.com", "email_status": "verified",
                "city": "Austin", "state": "TX",
                "employment_history": [
                    {"title": "Marketing Manager", "organization_name": "Acme SaaS"}
                ]
            },
            {"first_name": "Grace", "last_name": "Hopper", "email": "grace@example.com"}
        ]
    })
    .to_string()
}

fn agent_for(
    provider: ScriptedProvider,
    apollo_endpoint: String,
    sink: Arc<MemorySink>,
    config: &Config,
) -> ResearchAgent<ScriptedProvider> {
    let apollo = Arc::new(ApolloClient::new(&ApolloConfig {
        api_key: Some("test-key".to_string()),
        endpoint: apollo_endpoint,
    }));
    let unipile = Arc::new(UnipileClient::new(&UnipileConfig::default()));
    ResearchAgent::with_config(provider, apollo, unipile, sink, config)
}

#[tokio::test]
async fn plain_response_turn_emits_a_baseline_snapshot() {
    let sink = Arc::new(MemorySink::new());
    let provider = ScriptedProvider::replies(vec![ChatResponse::text("Hello! Ask me anything.")]);
    let agent = agent_for(
        provider,
        "http://127.0.0.1:1".to_string(),
        sink.clone(),
        &Config::default(),
    );

    let outcome = agent
        .run_turn(AgentState::with_user_message("hi"))
        .await
        .unwrap();

    assert!(outcome.pending_action.is_none());
    assert_eq!(
        outcome.state.last_assistant_text(),
        Some("Hello! Ask me anything.")
    );
    assert!(outcome.state.logs.is_empty());

    // Even an immediately-resolving turn produces one observable snapshot.
    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(
        snapshots[0].current_status,
        "Ready to help you find prospects"
    );
}

#[tokio::test]
async fn decision_node_binds_system_prompt_and_disables_parallel_calls() {
    let provider = ScriptedProvider::replies(vec![ChatResponse::text("ok")]);
    let recorder = provider.recorder();
    let mut agent = agent_for(
        provider,
        "http://127.0.0.1:1".to_string(),
        Arc::new(MemorySink::new()),
        &Config::default(),
    );
    agent.set_host_actions(vec![HostAction::new(
        "open_crm",
        "Open a CRM record in the UI",
        json!({"type": "object"}),
    )]);

    agent
        .run_turn(AgentState::with_user_message("hello"))
        .await
        .unwrap();

    let seen = recorder.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let params = &seen[0];

    assert!(!params.parallel_tool_calls);
    assert_eq!(params.messages[0].role, "system");
    assert!(params.messages[0]
        .content
        .as_deref()
        .unwrap()
        .contains("sales prospect research assistant"));
    assert_eq!(params.messages.last().unwrap().role, "user");

    // Both the agent's tools and the host actions are bound
    let bound: Vec<&str> = params
        .tools
        .iter()
        .map(|t| t.function.name.as_str())
        .collect();
    assert!(bound.contains(&"people_search"));
    assert!(bound.contains(&"open_crm"));
}

#[tokio::test]
async fn search_turn_runs_the_full_streaming_protocol() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/mixed_people/search")
        .with_status(200)
        .with_body(two_people_body())
        .create_async()
        .await;

    let sink = Arc::new(MemorySink::new());
    let provider = ScriptedProvider::replies(vec![
        ChatResponse::tool_call(search_call("call_1")),
        ChatResponse::text("Here are your Austin marketing managers."),
    ]);
    let agent = agent_for(provider, server.url(), sink.clone(), &Config::default());

    // Results from an earlier search are replaced, not merged
    let mut state = AgentState::with_user_message(
        "find marketing managers in SaaS companies in Austin",
    );
    state.people = vec![ebisu_apollo::PersonRecord {
        first_name: "Stale".to_string(),
        ..Default::default()
    }];

    let logs_before = state.logs.len();
    let outcome = agent.run_turn(state).await.unwrap();
    mock.assert_async().await;

    let state = outcome.state;
    assert!(outcome.pending_action.is_none());

    // Results replaced with the new record list
    assert_eq!(state.people.len(), 2);
    assert_eq!(state.people[0].first_name, "Ada");
    assert_eq!(state.people[0].email, "Unlock");
    assert_eq!(state.people[0].location, "Austin, TX");

    // Exactly four log entries for the success path, in protocol order
    assert_eq!(state.logs.len(), logs_before + 4);
    let kinds: Vec<LogKind> = state.logs.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LogKind::Progress,
            LogKind::Progress,
            LogKind::Success,
            LogKind::Progress
        ]
    );
    assert!(state.logs[0].message.contains("Starting people search"));
    assert!(state.logs[2].message.contains("Found 2 people"));

    // Closing assistant message and tool result are both in the final state
    let contents: Vec<&str> = state
        .messages
        .iter()
        .filter_map(|m| m.content.as_deref())
        .collect();
    assert!(contents.contains(&"Found 2 people. ✅"));
    let tool_msg = state
        .messages
        .iter()
        .find(|m| m.role == "tool")
        .expect("tool result message");
    assert_eq!(tool_msg.content.as_deref(), Some("Found 2 people."));
    assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_1"));

    assert_eq!(state.current_status, "Ready - 2 people loaded");
    assert_eq!(
        state.last_assistant_text(),
        Some("Here are your Austin marketing managers.")
    );

    // Observer saw: baseline, announce, mid-flight, final - log growing
    // monotonically across snapshots
    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 4);
    let log_lens: Vec<usize> = snapshots.iter().map(|s| s.logs.len()).collect();
    assert_eq!(log_lens, vec![0, 1, 2, 4]);

    // The announce snapshot carries the transient message, which never
    // reaches the canonical state
    let announce = &snapshots[1];
    assert_eq!(
        announce.messages.last().and_then(|m| m.content.as_deref()),
        Some("*Searching for people...* 🕵️")
    );
    assert!(!contents.contains(&"*Searching for people...* 🕵️"));

    assert_eq!(snapshots[2].current_status, "Executing search...");
    assert_eq!(
        snapshots[3].current_status,
        "Search completed - 2 people found"
    );
    assert_eq!(snapshots[3].people.len(), 2);
}

#[tokio::test]
async fn search_failure_aborts_the_turn_and_stays_observable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/mixed_people/search")
        .with_status(401)
        .with_body("{\"error\":\"unauthorized\"}")
        .create_async()
        .await;

    let sink = Arc::new(MemorySink::new());
    // The closing response is never requested: the turn aborts first
    let provider = ScriptedProvider::replies(vec![ChatResponse::tool_call(search_call("call_1"))]);
    let agent = agent_for(provider, server.url(), sink.clone(), &Config::default());

    let err = agent
        .run_turn(AgentState::with_user_message("find people"))
        .await
        .unwrap_err();

    match err {
        AgentError::Search(ApolloError::Api { status, .. }) => assert_eq!(status, 401),
        other => panic!("expected propagated provider error, got {:?}", other),
    }

    // The observer got the partial log including the error entry; results
    // were never touched and no closing message was produced.
    let snapshots = sink.snapshots();
    let last = snapshots.last().unwrap();
    assert_eq!(last.current_status, "Search failed");
    assert_eq!(last.logs.last().unwrap().kind, LogKind::Error);
    assert!(last
        .logs
        .last()
        .unwrap()
        .message
        .contains("People search failed"));
    assert!(last.people.is_empty());
    assert!(!last
        .messages
        .iter()
        .any(|m| m.content.as_deref().is_some_and(|c| c.contains("Found"))));
}

#[tokio::test]
async fn invalid_search_arguments_fail_before_any_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/mixed_people/search")
        .expect(0)
        .create_async()
        .await;

    let provider = ScriptedProvider::replies(vec![ChatResponse::tool_call(ToolCall {
        id: "call_1".to_string(),
        name: "people_search".to_string(),
        arguments: json!({"person_titles": "not-an-array"}),
    })]);
    let agent = agent_for(
        provider,
        server.url(),
        Arc::new(MemorySink::new()),
        &Config::default(),
    );

    let err = agent
        .run_turn(AgentState::with_user_message("find people"))
        .await
        .unwrap_err();

    assert!(matches!(err, AgentError::InvalidArguments(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn host_action_request_ends_the_turn_with_a_pending_call() {
    let sink = Arc::new(MemorySink::new());
    let provider = ScriptedProvider::replies(vec![ChatResponse::tool_call(ToolCall {
        id: "call_7".to_string(),
        name: "open_crm".to_string(),
        arguments: json!({"record": "ada"}),
    })]);
    let mut agent = agent_for(
        provider,
        "http://127.0.0.1:1".to_string(),
        sink,
        &Config::default(),
    );
    agent.set_host_actions(vec![HostAction::new(
        "open_crm",
        "Open a CRM record in the UI",
        json!({"type": "object"}),
    )]);

    let outcome = agent
        .run_turn(AgentState::with_user_message("open ada's record"))
        .await
        .unwrap();

    let pending = outcome.pending_action.expect("pending host action");
    assert_eq!(pending.name, "open_crm");

    // The request is recorded in the conversation, but nothing executed
    let last = outcome.state.messages.last().unwrap();
    assert_eq!(last.role, "assistant");
    assert!(last.tool_calls.is_some());
    assert!(outcome.state.logs.is_empty());
    assert!(!outcome.state.messages.iter().any(|m| m.role == "tool"));
}

#[tokio::test]
async fn generic_tools_are_wrapped_without_choreography() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/mixed_companies/search")
        .with_status(200)
        .with_body(json!({"organizations": [{"name": "Acme SaaS"}]}).to_string())
        .create_async()
        .await;

    let sink = Arc::new(MemorySink::new());
    let provider = ScriptedProvider::replies(vec![
        ChatResponse::tool_call(ToolCall {
            id: "call_2".to_string(),
            name: "organization_search".to_string(),
            arguments: json!({"q_organization_name": "Acme"}),
        }),
        ChatResponse::text("Acme SaaS looks like a fit."),
    ]);
    let agent = agent_for(provider, server.url(), sink.clone(), &Config::default());

    let outcome = agent
        .run_turn(AgentState::with_user_message("look up Acme"))
        .await
        .unwrap();

    let tool_msg = outcome
        .state
        .messages
        .iter()
        .find(|m| m.role == "tool")
        .expect("tool result");
    assert_eq!(tool_msg.name.as_deref(), Some("organization_search"));
    assert!(tool_msg.content.as_deref().unwrap().contains("Acme SaaS"));

    // No progress choreography on the generic path; both decisions saw an
    // empty log, so both emitted the baseline snapshot and nothing else
    assert!(outcome.state.logs.is_empty());
    assert_eq!(sink.len(), 2);
    assert!(sink.snapshots().iter().all(|s| s.logs.is_empty()));
}

#[tokio::test]
async fn unknown_tool_names_are_rejected() {
    let provider = ScriptedProvider::replies(vec![ChatResponse::tool_call(ToolCall {
        id: "call_3".to_string(),
        name: "not_a_tool".to_string(),
        arguments: json!({}),
    })]);
    let agent = agent_for(
        provider,
        "http://127.0.0.1:1".to_string(),
        Arc::new(MemorySink::new()),
        &Config::default(),
    );

    let err = agent
        .run_turn(AgentState::with_user_message("do something odd"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::ToolNotFound(name) if name == "not_a_tool"));
}

#[tokio::test]
async fn only_the_first_of_several_tool_calls_is_honored() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/mixed_companies/search")
        .with_status(200)
        .with_body(json!({"organizations": []}).to_string())
        .create_async()
        .await;
    let people_mock = server
        .mock("POST", "/v1/mixed_people/search")
        .expect(0)
        .create_async()
        .await;

    let provider = ScriptedProvider::replies(vec![
        ChatResponse {
            content: None,
            tool_calls: vec![
                ToolCall {
                    id: "call_a".to_string(),
                    name: "organization_search".to_string(),
                    arguments: json!({}),
                },
                ToolCall {
                    id: "call_b".to_string(),
                    name: "people_search".to_string(),
                    arguments: json!({}),
                },
            ],
            finish_reason: "tool_calls".to_string(),
            usage: Default::default(),
        },
        ChatResponse::text("done"),
    ]);
    let agent = agent_for(
        provider,
        server.url(),
        Arc::new(MemorySink::new()),
        &Config::default(),
    );

    let outcome = agent
        .run_turn(AgentState::with_user_message("search twice"))
        .await
        .unwrap();

    // Only the first call ran; the second was never authorized
    people_mock.assert_async().await;
    let assistant = outcome
        .state
        .messages
        .iter()
        .find(|m| m.tool_calls.is_some())
        .unwrap();
    assert_eq!(assistant.tool_calls.as_ref().unwrap().len(), 1);
    assert!(outcome.state.people.is_empty());
}

#[tokio::test]
async fn runaway_tool_chains_hit_the_round_cap() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/mixed_people/search")
        .with_status(200)
        .with_body(json!({"people": []}).to_string())
        .create_async()
        .await;

    let mut config = Config::default();
    config.agent.max_tool_rounds = 2;

    let script: Vec<ChatResponse> = (0..5)
        .map(|i| ChatResponse::tool_call(search_call(&format!("call_{}", i))))
        .collect();
    let agent = agent_for(
        ScriptedProvider::replies(script),
        server.url(),
        Arc::new(MemorySink::new()),
        &config,
    );

    let err = agent
        .run_turn(AgentState::with_user_message("loop forever"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::MaxToolRounds(2)));
}

#[tokio::test]
async fn model_failure_surfaces_without_retry() {
    let provider = ScriptedProvider::new(vec![Err(ProviderError::Api(
        "upstream unavailable".to_string(),
    ))]);
    let agent = agent_for(
        provider,
        "http://127.0.0.1:1".to_string(),
        Arc::new(MemorySink::new()),
        &Config::default(),
    );

    let err = agent
        .run_turn(AgentState::with_user_message("hello"))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Provider(_)));
}

#[tokio::test]
async fn second_turn_does_not_re_emit_the_baseline() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/mixed_people/search")
        .with_status(200)
        .with_body(two_people_body())
        .create_async()
        .await;

    let sink = Arc::new(MemorySink::new());
    let provider = ScriptedProvider::replies(vec![
        ChatResponse::tool_call(search_call("call_1")),
        ChatResponse::text("found them"),
    ]);
    let agent = agent_for(provider, server.url(), sink.clone(), &Config::default());

    let outcome = agent
        .run_turn(AgentState::with_user_message("find people"))
        .await
        .unwrap();
    let first_turn_snapshots = sink.len();

    // Continue from the returned snapshot; its log is non-empty now
    let mut state = outcome.state;
    state.messages.push(ebisu_provider::Message::user("thanks"));

    let provider = ScriptedProvider::replies(vec![ChatResponse::text("any time")]);
    let agent = agent_for(provider, server.url(), sink.clone(), &Config::default());
    agent.run_turn(state).await.unwrap();

    // No new baseline emission for a session that already has a log
    assert_eq!(sink.len(), first_turn_snapshots);
}
