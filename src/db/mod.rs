mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    AuthenticatedIdentity, Channel, CreateOfferRequest, Offer, UpdateOfferRequest, User, Workspace,
};

/// Store-level failure. A missing record is a normal negative result and is
/// expressed as `Ok(None)`, never as an error; `Unavailable` is reserved for
/// infrastructure problems and surfaces as a retryable 500 upstream.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Unavailable(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Repository seam over the credential/business datastore. The persistence
/// engine behind it is opaque; everything the guard chain and handlers need
/// goes through this trait so it can be swapped for a fake in tests.
#[async_trait]
pub trait Datastore: Send + Sync {
    /// Create a user. Fails with `Conflict` when the email is already taken
    /// (case-sensitive exact match, as persisted).
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<User>;

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Expand a user id into the full identity with every membership and its
    /// workspace summary. `None` when the user no longer exists.
    async fn user_identity(&self, user_id: Uuid) -> StoreResult<Option<AuthenticatedIdentity>>;

    /// Create a workspace owned by `owner_id`: an `owner` membership plus the
    /// four seeded channels, all in one logical step.
    async fn create_workspace(&self, owner_id: Uuid, name: &str) -> StoreResult<Workspace>;

    async fn workspace_channels(&self, workspace_id: Uuid) -> StoreResult<Vec<Channel>>;

    async fn list_offers(&self, workspace_id: Uuid) -> StoreResult<Vec<Offer>>;

    async fn create_offer(
        &self,
        workspace_id: Uuid,
        request: CreateOfferRequest,
    ) -> StoreResult<Offer>;

    async fn offer(&self, workspace_id: Uuid, offer_id: Uuid) -> StoreResult<Option<Offer>>;

    async fn update_offer(
        &self,
        workspace_id: Uuid,
        offer_id: Uuid,
        changes: UpdateOfferRequest,
    ) -> StoreResult<Option<Offer>>;

    /// Returns whether an offer was deleted.
    async fn delete_offer(&self, workspace_id: Uuid, offer_id: Uuid) -> StoreResult<bool>;
}
