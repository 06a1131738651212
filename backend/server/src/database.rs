//! # Redis
//!
//! RAM database.
//!
//! Core purpose is to store and lookup per-user completion state and the accounts behind caller identities.
//!
//! ## Requirements
//!
//! - Fast lookups
//! - Small dataset, a few thousand locations
//! - One record per user per location ever toggled
//!
//! ## Implementation
//!
//! - `users` hash: external identity -> internal user id
//! - `next_user_id` counter, `INCR` hands out ids
//! - `completions:{user}` hash: location id -> `1` / `0`
//! - Create uses `HSETNX`, so only one concurrent creator wins
//! - Flips are read then write, last write wins
use std::{
    collections::{BTreeSet, HashMap},
    time::Duration,
};

use async_trait::async_trait;
use catalog::payloads::{CompletionRecord, UserId};
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::store::{CompletionStore, StoreError};

const USERS_KEY: &str = "users";
const NEXT_USER_KEY: &str = "next_user_id";

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, redis::RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;

    client.get_connection_manager_with_config(config).await
}

fn completions_key(user: UserId) -> String {
    format!("completions:{user}")
}

fn encode(completed: bool) -> u8 {
    u8::from(completed)
}

fn decode(value: &str) -> bool {
    value == "1"
}

#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl CompletionStore for RedisStore {
    async fn find_user(&self, identity: &str) -> Result<Option<UserId>, StoreError> {
        let mut connection = self.connection.clone();
        let id: Option<UserId> = connection.hget(USERS_KEY, identity).await?;

        Ok(id)
    }

    async fn register_user(&self, identity: &str) -> Result<(UserId, bool), StoreError> {
        let mut connection = self.connection.clone();

        let existing: Option<UserId> = connection.hget(USERS_KEY, identity).await?;
        if let Some(id) = existing {
            return Ok((id, false));
        }

        let candidate: UserId = connection.incr(NEXT_USER_KEY, 1).await?;
        let created: bool = connection.hset_nx(USERS_KEY, identity, candidate).await?;

        if created {
            return Ok((candidate, true));
        }

        // Registered concurrently, the candidate id is simply skipped.
        let id: UserId = connection.hget(USERS_KEY, identity).await?;
        Ok((id, false))
    }

    async fn find(&self, user: UserId, location: u32) -> Result<Option<CompletionRecord>, StoreError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.hget(completions_key(user), location).await?;

        Ok(value.map(|value| CompletionRecord {
            user_id: user,
            location_id: location,
            completed: decode(&value),
        }))
    }

    async fn create(&self, user: UserId, location: u32) -> Result<CompletionRecord, StoreError> {
        let mut connection = self.connection.clone();
        let created: bool = connection
            .hset_nx(completions_key(user), location, encode(true))
            .await?;

        if !created {
            return Err(StoreError::Conflict);
        }

        Ok(CompletionRecord::created(user, location))
    }

    async fn set(&self, record: &CompletionRecord) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection
            .hset(
                completions_key(record.user_id),
                record.location_id,
                encode(record.completed),
            )
            .await?;

        Ok(())
    }

    async fn completed_ids(&self, user: UserId) -> Result<BTreeSet<u32>, StoreError> {
        let mut connection = self.connection.clone();
        let records: HashMap<u32, String> = connection.hgetall(completions_key(user)).await?;

        Ok(records
            .into_iter()
            .filter(|(_, value)| decode(value))
            .map(|(location, _)| location)
            .collect())
    }
}
