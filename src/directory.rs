use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::UserRecord;

/// UserDirectory Trait
///
/// Abstract source of the raw user descriptors that sessions are resolved
/// against. Handlers and the session extractor only see this trait, so the
/// backing store can be swapped (JSON file, test mock) without touching them.
///
/// **Send + Sync + async_trait** make `Arc<dyn UserDirectory>` shareable across
/// Axum's task boundaries.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    // Returns the current descriptor, or None when the user no longer exists.
    async fn get_user(&self, id: Uuid) -> Option<UserRecord>;
    // All known users, ordered by email.
    async fn list_users(&self) -> Vec<UserRecord>;
}

/// DirectoryState
///
/// The concrete type used to share directory access across the application state.
pub type DirectoryState = Arc<dyn UserDirectory>;

/// InMemoryDirectory
///
/// Directory held entirely in memory, seeded from a JSON array of `UserRecord`s.
/// Immutable after construction.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    users: BTreeMap<Uuid, UserRecord>,
}

impl InMemoryDirectory {
    pub fn new(records: Vec<UserRecord>) -> Self {
        let users = records.into_iter().map(|user| (user.id, user)).collect();
        Self { users }
    }

    /// Parses a JSON array of user records. Later duplicates of an id win.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let records: Vec<UserRecord> =
            serde_json::from_str(json).map_err(|e| format!("invalid user directory JSON: {}", e))?;
        Ok(Self::new(records))
    }

    /// load
    ///
    /// Reads the directory file named by `USER_DIRECTORY_PATH`. A missing path
    /// yields an empty directory.
    pub fn load(path: Option<&str>) -> Result<Self, String> {
        let Some(path) = path else {
            tracing::warn!("No user directory configured; every session lookup will be rejected");
            return Ok(Self::default());
        };

        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read user directory {}: {}", path, e))?;
        let directory = Self::from_json(&json)?;

        tracing::info!(path = %path, users = directory.len(), "User directory loaded");
        Ok(directory)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn get_user(&self, id: Uuid) -> Option<UserRecord> {
        self.users.get(&id).cloned()
    }

    async fn list_users(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }
}
