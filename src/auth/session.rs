use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::StoreResult;

/// Server-side session store keyed by an opaque token. Sessions move through
/// `absent -> active -> destroyed`; `lookup` treats expired and destroyed
/// identically.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Mint a new token bound to `user_id` with the store's TTL.
    async fn create(&self, user_id: Uuid) -> StoreResult<String>;

    /// `None` for absent, expired, or destroyed tokens. Store failures are
    /// errors; a missing session is not.
    async fn lookup(&self, token: &str) -> StoreResult<Option<Uuid>>;

    /// Idempotent: destroying an absent or already-destroyed token succeeds.
    async fn destroy(&self, token: &str) -> StoreResult<()>;
}

struct SessionRecord {
    user_id: Uuid,
    expires_at: DateTime<Utc>,
}

/// In-memory session store with an absolute TTL from creation.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: RwLock::new(HashMap::new()),
        }
    }
}

/// 256 bits of OS entropy, hex-encoded. Uniqueness is assumed
/// cryptographically strong; collisions are not handled.
fn mint_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: Uuid) -> StoreResult<String> {
        let token = mint_token();
        let record = SessionRecord {
            user_id,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.write().await.insert(token.clone(), record);
        Ok(token)
    }

    async fn lookup(&self, token: &str) -> StoreResult<Option<Uuid>> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(record) if record.expires_at > Utc::now() => {
                    return Ok(Some(record.user_id))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // Expired: prune under the write lock so the token reads as absent
        // from here on.
        self.sessions.write().await.remove(token);
        Ok(None)
    }

    async fn destroy(&self, token: &str) -> StoreResult<()> {
        self.sessions.write().await.remove(token);
        Ok(())
    }
}
