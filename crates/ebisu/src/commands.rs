//! Command implementations

use anyhow::{Context, Result};
use std::io::Write;
use std::sync::Arc;

use ebisu_agent::ResearchAgent;
use ebisu_apollo::ApolloClient;
use ebisu_config::{self, Config};
use ebisu_provider::{Message, OpenAiProvider, Provider};
use ebisu_session::SessionManager;
use ebisu_state::{ChannelSink, SnapshotReceiver};
use ebisu_unipile::UnipileClient;

/// Initialize config and data directories
pub async fn init_command() -> Result<()> {
    ebisu_config::init().await?;
    println!("✓ Config ready at {:?}", ebisu_config::config_path());
    println!("✓ Sessions at {:?}", ebisu_config::sessions_dir());
    println!();
    println!("Set OPENAI_API_KEY and APOLLO_API_KEY (and optionally the UNIPILE_* vars),");
    println!("or edit the config file, then run: ebisu chat");
    Ok(())
}

/// Run one message or an interactive loop against the agent
pub async fn chat_command(message: Option<String>, session_key: String) -> Result<()> {
    let config = Config::load_with_env().await?;

    let api_key = config
        .model
        .api_key
        .clone()
        .context("No model API key configured. Set OPENAI_API_KEY or edit ~/.ebisu/config.json")?;

    let provider = OpenAiProvider::new(
        api_key,
        config.model.api_base.clone(),
        Some(config.model.model.clone()),
    );
    let apollo = Arc::new(ApolloClient::new(&config.apollo));
    let unipile = Arc::new(UnipileClient::new(&config.unipile));

    let (sink, rx) = ChannelSink::channel();
    let printer = tokio::spawn(print_progress(rx));

    let agent = ResearchAgent::with_config(provider, apollo, unipile, Arc::new(sink), &config);
    let mut sessions = SessionManager::with_max_messages(
        ebisu_config::sessions_dir(),
        config.agent.session_max_messages,
    );

    if let Some(msg) = message {
        run_one(&agent, &mut sessions, &session_key, &msg).await?;
    } else {
        println!("Interactive mode (type 'exit' to quit)");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;

            let input = input.trim();
            if input.is_empty() {
                continue;
            }
            if input == "exit" || input == "quit" {
                break;
            }

            // A failed turn leaves the persisted session at its previous
            // snapshot; the conversation continues from there.
            if let Err(e) = run_one(&agent, &mut sessions, &session_key, input).await {
                eprintln!("turn failed: {}", e);
            }
        }
    }

    // Dropping the agent closes the sink; the printer drains and exits
    drop(agent);
    let _ = printer.await;

    Ok(())
}

async fn run_one<P: Provider>(
    agent: &ResearchAgent<P>,
    sessions: &mut SessionManager,
    session_key: &str,
    message: &str,
) -> Result<()> {
    let mut state = {
        let session = sessions.get_or_create(session_key).await;
        session.state.clone()
    };
    state.messages.push(Message::user(message));

    let outcome = agent.run_turn(state).await?;

    if let Some(reply) = outcome.state.last_assistant_text() {
        println!("\n{}\n", reply);
    }
    if !outcome.state.people.is_empty() {
        println!("({} people loaded)", outcome.state.people.len());
    }
    if let Some(action) = &outcome.pending_action {
        println!("(pending host action: {})", action.name);
    }

    let snapshot = {
        let session = sessions.get_or_create(session_key).await;
        session.update_state(outcome.state);
        session.clone()
    };
    sessions.save(&snapshot).await?;

    Ok(())
}

/// Print new progress-log lines and status changes as snapshots arrive
async fn print_progress(mut rx: SnapshotReceiver) {
    let mut printed_logs = 0usize;
    let mut last_status = String::new();

    while let Some(snapshot) = rx.recv().await {
        if snapshot.current_status != last_status && !snapshot.current_status.is_empty() {
            println!("· {}", snapshot.current_status);
            last_status = snapshot.current_status.clone();
        }
        for entry in snapshot.logs.iter().skip(printed_logs) {
            println!("  [{}] {}", entry.kind.as_str(), entry.message);
        }
        printed_logs = printed_logs.max(snapshot.logs.len());
    }
}

/// Show which credentials are configured and how many sessions exist
pub async fn status_command() -> Result<()> {
    let config = Config::load_with_env().await?;

    let set = |v: &Option<String>| {
        if v.as_deref().is_some_and(|s| !s.is_empty()) {
            "[set]"
        } else {
            "[not set]"
        }
    };

    println!("ebisu status");
    println!("  model:    {} ({})", set(&config.model.api_key), config.model.model);
    println!("  apollo:   {} ({})", set(&config.apollo.api_key), config.apollo.endpoint);
    println!(
        "  unipile:  dsn {} / key {} / account {}",
        set(&config.unipile.dsn),
        set(&config.unipile.api_key),
        set(&config.unipile.account_id)
    );

    let sessions = SessionManager::new(ebisu_config::sessions_dir());
    let keys = sessions.list().await;
    println!("  sessions: {}", keys.len());
    for key in keys {
        println!("    - {}", key);
    }

    Ok(())
}
