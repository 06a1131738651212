//! # Completion Store
//!
//! Per-user completion state plus the account records behind caller identities.
//!
//! ## Toggle
//! - Existing record: flip `completed` and write it back, last write wins
//! - No record: create one with `completed: true`
//! - Create is create-if-absent. Losing that race returns [`StoreError::Conflict`], which
//!   [`toggle`] treats as "someone else created it" and retries as an update
use std::{
    collections::{BTreeSet, HashMap, hash_map::Entry},
    sync::Mutex,
};

use async_trait::async_trait;
use catalog::payloads::{CompletionRecord, UserId};
use thiserror::Error;
use tracing::{debug, warn};

const TOGGLE_ATTEMPTS: usize = 3;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record already exists")]
    Conflict,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Store lock poisoned")]
    Poisoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    Created(CompletionRecord),
    Updated(CompletionRecord),
}

impl Toggled {
    pub fn record(&self) -> CompletionRecord {
        match self {
            Toggled::Created(record) | Toggled::Updated(record) => *record,
        }
    }
}

#[async_trait]
pub trait CompletionStore: Send + Sync {
    /// Internal account id for an external caller identity.
    async fn find_user(&self, identity: &str) -> Result<Option<UserId>, StoreError>;

    /// Idempotent. The flag is true when the account did not exist before.
    async fn register_user(&self, identity: &str) -> Result<(UserId, bool), StoreError>;

    async fn find(&self, user: UserId, location: u32) -> Result<Option<CompletionRecord>, StoreError>;

    /// Fails with [`StoreError::Conflict`] if a record already exists.
    async fn create(&self, user: UserId, location: u32) -> Result<CompletionRecord, StoreError>;

    async fn set(&self, record: &CompletionRecord) -> Result<(), StoreError>;

    async fn completed_ids(&self, user: UserId) -> Result<BTreeSet<u32>, StoreError>;
}

pub async fn toggle(
    store: &dyn CompletionStore,
    user: UserId,
    location: u32,
) -> Result<Toggled, StoreError> {
    for attempt in 1..=TOGGLE_ATTEMPTS {
        if let Some(existing) = store.find(user, location).await? {
            let record = existing.flipped();
            store.set(&record).await?;

            return Ok(Toggled::Updated(record));
        }

        match store.create(user, location).await {
            Ok(record) => return Ok(Toggled::Created(record)),
            Err(StoreError::Conflict) => {
                debug!("Create raced for user {user} location {location}, attempt {attempt}");
            }
            Err(e) => return Err(e),
        }
    }

    warn!("Gave up toggling user {user} location {location} after {TOGGLE_ATTEMPTS} attempts");
    Err(StoreError::Conflict)
}

#[derive(Default)]
struct MemoryState {
    users: HashMap<String, UserId>,
    next_user_id: UserId,
    records: HashMap<(UserId, u32), bool>,
}

/// In-process store. State is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut MemoryState) -> T) -> Result<T, StoreError> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;

        Ok(f(&mut state))
    }

    #[cfg(test)]
    pub(crate) fn record_count(&self) -> usize {
        self.with_state(|state| state.records.len()).unwrap()
    }
}

#[async_trait]
impl CompletionStore for MemoryStore {
    async fn find_user(&self, identity: &str) -> Result<Option<UserId>, StoreError> {
        self.with_state(|state| state.users.get(identity).copied())
    }

    async fn register_user(&self, identity: &str) -> Result<(UserId, bool), StoreError> {
        self.with_state(|state| {
            if let Some(&id) = state.users.get(identity) {
                return (id, false);
            }

            state.next_user_id += 1;
            let id = state.next_user_id;
            state.users.insert(identity.to_string(), id);

            (id, true)
        })
    }

    async fn find(&self, user: UserId, location: u32) -> Result<Option<CompletionRecord>, StoreError> {
        self.with_state(|state| {
            state
                .records
                .get(&(user, location))
                .map(|&completed| CompletionRecord {
                    user_id: user,
                    location_id: location,
                    completed,
                })
        })
    }

    async fn create(&self, user: UserId, location: u32) -> Result<CompletionRecord, StoreError> {
        self.with_state(|state| match state.records.entry((user, location)) {
            Entry::Vacant(entry) => {
                entry.insert(true);
                Ok(CompletionRecord::created(user, location))
            }
            Entry::Occupied(_) => Err(StoreError::Conflict),
        })?
    }

    async fn set(&self, record: &CompletionRecord) -> Result<(), StoreError> {
        self.with_state(|state| {
            state
                .records
                .insert((record.user_id, record.location_id), record.completed);
        })
    }

    async fn completed_ids(&self, user: UserId) -> Result<BTreeSet<u32>, StoreError> {
        self.with_state(|state| {
            state
                .records
                .iter()
                .filter(|&(&(owner, _), &completed)| owner == user && completed)
                .map(|(&(_, location), _)| location)
                .collect()
        })
    }
}
