use crate::data_models::UserId;
use crate::db::{normalize_keyword, DatabaseError, PreferenceStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinError;
use tracing::error;

const SAVE_FAILED: &str = "Could not save your keywords right now, please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    List,
    Remove(String),
}

impl Command {
    /// Parses `/add <keyword text>`, `/list` and `/remove <keyword text>`.
    /// A `@botname` suffix on the command is ignored.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?.strip_prefix('/')?;
        let name = head.split('@').next().unwrap_or(head).to_lowercase();
        let argument = parts.collect::<Vec<_>>().join(" ");
        match name.as_str() {
            "add" => Some(Command::Add(argument)),
            "list" => Some(Command::List),
            "remove" => Some(Command::Remove(argument)),
            _ => None,
        }
    }
}

/// Text shown to the user, plus whether the store accepted the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub accepted: bool,
    pub message: String,
}

impl Reply {
    fn accepted(message: String) -> Self {
        Self {
            accepted: true,
            message,
        }
    }

    fn rejected(message: String) -> Self {
        Self {
            accepted: false,
            message,
        }
    }
}

pub fn execute(store: &PreferenceStore, user: &UserId, command: &Command) -> Reply {
    match command {
        Command::Add(keyword) => add_keyword(store, user, keyword),
        Command::List => list_keywords(store, user),
        Command::Remove(keyword) => remove_keyword(store, user, keyword),
    }
}

/// Runs a command on the blocking pool, since store mutations write to disk.
pub async fn execute_blocking(
    store: Arc<PreferenceStore>,
    user: UserId,
    command: Command,
) -> Result<Reply, JoinError> {
    tokio::task::spawn_blocking(move || execute(&store, &user, &command)).await
}

fn add_keyword(store: &PreferenceStore, user: &UserId, keyword: &str) -> Reply {
    let shown = normalize_keyword(keyword).unwrap_or_default();
    match store.add(user, keyword) {
        Ok(true) => Reply::accepted(format!("Keyword '{shown}' added!")),
        Ok(false) => Reply::rejected(format!(
            "Keyword '{shown}' already in your list or invalid."
        )),
        Err(err) => save_failed(user, err),
    }
}

fn list_keywords(store: &PreferenceStore, user: &UserId) -> Reply {
    let keywords = store.list(user);
    if keywords.is_empty() {
        return Reply::accepted("You have no keywords yet.".to_string());
    }
    Reply::accepted(format!("Your keywords:\n{}", keywords.join("\n")))
}

fn remove_keyword(store: &PreferenceStore, user: &UserId, keyword: &str) -> Reply {
    let shown = normalize_keyword(keyword).unwrap_or_default();
    match store.remove(user, keyword) {
        Ok(true) => Reply::accepted(format!("Keyword '{shown}' removed.")),
        Ok(false) => Reply::rejected(format!("Keyword '{shown}' not found in your list.")),
        Err(err) => save_failed(user, err),
    }
}

fn save_failed(user: &UserId, err: DatabaseError) -> Reply {
    error!(user = %user, error = %err, "failed to persist keyword preferences");
    Reply::rejected(SAVE_FAILED.to_string())
}
