//! Session persistence
//!
//! A session wraps the conversation-state snapshot a host carries between
//! turns. Sessions are cached in memory and stored as pretty JSON files,
//! one per key.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use ebisu_config::paths::safe_filename;
use ebisu_state::AgentState;

/// Default message-window size kept per session
pub const DEFAULT_MAX_MESSAGES: usize = 100;

/// A persisted conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: String,
    /// Snapshot produced by the last completed turn
    pub state: AgentState,
    pub created_at: DateTime<Local>,
    pub updated_at: DateTime<Local>,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_MESSAGES
}

impl Session {
    pub fn new(key: impl Into<String>) -> Self {
        Self::with_max_messages(key, DEFAULT_MAX_MESSAGES)
    }

    pub fn with_max_messages(key: impl Into<String>, max_messages: usize) -> Self {
        let now = Local::now();
        Self {
            key: key.into(),
            state: AgentState::new(),
            created_at: now,
            updated_at: now,
            max_messages,
        }
    }

    /// Replace the snapshot after a completed turn
    ///
    /// The message window is trimmed here, between turns; a turn in flight
    /// never loses messages.
    pub fn update_state(&mut self, state: AgentState) {
        self.state = state;
        self.trim_messages();
        self.updated_at = Local::now();
    }

    fn trim_messages(&mut self) {
        let len = self.state.messages.len();
        if len > self.max_messages {
            self.state.messages.drain(0..len - self.max_messages);
            debug!(
                key = %self.key,
                kept = self.state.messages.len(),
                "session message window trimmed"
            );
        }
    }

    pub fn clear(&mut self) {
        self.state = AgentState::new();
        self.updated_at = Local::now();
    }
}

/// Cache-over-files store of sessions
pub struct SessionManager {
    sessions_dir: PathBuf,
    cache: HashMap<String, Session>,
    max_messages: usize,
}

impl SessionManager {
    pub fn new(sessions_dir: impl AsRef<Path>) -> Self {
        Self::with_max_messages(sessions_dir, DEFAULT_MAX_MESSAGES)
    }

    pub fn with_max_messages(sessions_dir: impl AsRef<Path>, max_messages: usize) -> Self {
        let sessions_dir = sessions_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&sessions_dir).ok();

        Self {
            sessions_dir,
            cache: HashMap::new(),
            max_messages,
        }
    }

    /// Fetch a session, loading from disk or creating it as needed
    pub async fn get_or_create(&mut self, key: &str) -> &mut Session {
        if !self.cache.contains_key(key) {
            let session = self
                .load(key)
                .await
                .unwrap_or_else(|| Session::with_max_messages(key, self.max_messages));
            self.cache.insert(key.to_string(), session);
        }
        self.cache.get_mut(key).unwrap()
    }

    pub async fn save(&self, session: &Session) -> std::io::Result<()> {
        let path = self.session_path(&session.key);
        let content = serde_json::to_string_pretty(session)?;
        tokio::fs::write(path, content).await?;
        debug!(key = %session.key, "session saved");
        Ok(())
    }

    async fn load(&self, key: &str) -> Option<Session> {
        let path = self.session_path(key);
        if !path.exists() {
            return None;
        }

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => match serde_json::from_str::<Session>(&content) {
                Ok(mut session) => {
                    session.max_messages = self.max_messages;
                    debug!(key, "session loaded");
                    Some(session)
                }
                Err(e) => {
                    warn!(key, error = %e, "failed to parse session");
                    None
                }
            },
            Err(e) => {
                warn!(key, error = %e, "failed to read session");
                None
            }
        }
    }

    pub async fn delete(&mut self, key: &str) -> std::io::Result<bool> {
        self.cache.remove(key);
        let path = self.session_path(key);
        if path.exists() {
            tokio::fs::remove_file(path).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Keys of every session on disk
    pub async fn list(&self) -> Vec<String> {
        let mut keys = Vec::new();

        if let Ok(mut entries) = tokio::fs::read_dir(&self.sessions_dir).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                if let Some(name) = entry.file_name().to_str() {
                    if let Some(stripped) = name.strip_suffix(".json") {
                        keys.push(stripped.to_string());
                    }
                }
            }
        }

        keys.sort();
        keys
    }

    fn session_path(&self, key: &str) -> PathBuf {
        self.sessions_dir
            .join(format!("{}.json", safe_filename(key)))
    }
}
