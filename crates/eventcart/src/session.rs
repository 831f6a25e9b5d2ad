//! # Shared Sessions
//!
//! A planning session is saved to, and loaded from, an externally owned
//! record so collaborators can open the same cart through a shared link.
//!
//! - [`SessionData`] is the wire shape of that record.
//! - [`SessionRepository`] is the remote store, as seen by the core.
//! - [`SavedSessions`] is the local list of `{session id → display name}`
//!   pairs the user has opened or saved, kept in `sessions.json`.
//!
//! ## Local Layout
//!
//! ```text
//! <data dir>/
//! └── sessions.json   # [{ "id", "name", "saved_at" }], most recent first
//! ```
//!
//! Writes go to a temp file that is renamed over `sessions.json`, so a crash
//! never leaves a half-written list behind.

use crate::error::{EventCartError, Result};
use crate::model::{CartEntry, CompositeId, EventDetails};
use crate::reactions::Reactions;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SESSIONS_FILE: &str = "sessions.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionData {
    pub favorited: IndexMap<CompositeId, CartEntry>,
    pub locked_in: IndexMap<CompositeId, CartEntry>,
    pub reactions: Reactions,
    pub event_details: EventDetails,
    pub collaborators: Vec<String>,
}

/// Remote storage for shared sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Load a session by id.
    async fn load(&self, session_id: &str) -> Result<SessionData>;

    /// Store a new session and return its id.
    async fn create(&self, data: &SessionData) -> Result<String>;

    /// Overwrite an existing session.
    async fn update(&self, session_id: &str, data: &SessionData) -> Result<()>;
}

/// Link that opens `session_id` for another collaborator.
pub fn share_link(base_url: &str, session_id: &str) -> String {
    let separator = if base_url.contains('?') { '&' } else { '?' };
    format!("{}{}session={}", base_url, separator, session_id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedSession {
    pub id: String,
    pub name: String,
    pub saved_at: DateTime<Utc>,
}

/// Locally cached list of sessions this user knows about.
#[derive(Debug)]
pub struct SavedSessions {
    path: PathBuf,
    entries: Vec<SavedSession>,
}

impl SavedSessions {
    /// `sessions.json` in the OS-appropriate data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("com", "eventcart", "eventcart").ok_or_else(|| {
            EventCartError::Config("Could not determine data directory".to_string())
        })?;
        Ok(dirs.data_dir().join(SESSIONS_FILE))
    }

    /// Open the list stored at `path`. A missing file is an empty list.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Most recently saved first.
    pub fn entries(&self) -> &[SavedSession] {
        &self.entries
    }

    pub fn name_of(&self, session_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|s| s.id == session_id)
            .map(|s| s.name.as_str())
    }

    /// Record a session under a display name, moving it to the front.
    pub fn remember(&mut self, session_id: &str, name: &str) -> Result<()> {
        self.entries.retain(|s| s.id != session_id);
        self.entries.insert(
            0,
            SavedSession {
                id: session_id.to_string(),
                name: name.to_string(),
                saved_at: Utc::now(),
            },
        );
        self.save()
    }

    /// Drop a session from the list. Returns whether it was present.
    pub fn forget(&mut self, session_id: &str) -> Result<bool> {
        let before = self.entries.len();
        self.entries.retain(|s| s.id != session_id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        let dir = self
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        if !dir.as_os_str().is_empty() && !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let content = serde_json::to_string_pretty(&self.entries)?;
        let tmp_file = dir.join(format!(".sessions-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp_file, content)?;
        fs::rename(&tmp_file, &self.path)?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Session repository held in memory. `fail_all` makes every call return
    /// a remote error.
    #[derive(Debug, Default)]
    pub struct InMemorySessionRepository {
        sessions: Mutex<HashMap<String, SessionData>>,
        pub fail_all: bool,
    }

    impl InMemorySessionRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail_all: true,
                ..Self::default()
            }
        }

        pub fn with_session(self, session_id: &str, data: SessionData) -> Self {
            self.sessions
                .lock()
                .unwrap()
                .insert(session_id.to_string(), data);
            self
        }

        pub fn get(&self, session_id: &str) -> Option<SessionData> {
            self.sessions.lock().unwrap().get(session_id).cloned()
        }

        fn check(&self) -> Result<()> {
            if self.fail_all {
                return Err(EventCartError::RemoteFetch(
                    "session store unavailable".to_string(),
                ));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl SessionRepository for InMemorySessionRepository {
        async fn load(&self, session_id: &str) -> Result<SessionData> {
            self.check()?;
            self.get(session_id)
                .ok_or_else(|| EventCartError::SessionNotFound(session_id.to_string()))
        }

        async fn create(&self, data: &SessionData) -> Result<String> {
            self.check()?;
            let id = Uuid::new_v4().to_string();
            self.sessions
                .lock()
                .unwrap()
                .insert(id.clone(), data.clone());
            Ok(id)
        }

        async fn update(&self, session_id: &str, data: &SessionData) -> Result<()> {
            self.check()?;
            let mut sessions = self.sessions.lock().unwrap();
            match sessions.get_mut(session_id) {
                Some(existing) => {
                    *existing = data.clone();
                    Ok(())
                }
                None => Err(EventCartError::SessionNotFound(session_id.to_string())),
            }
        }
    }
}
