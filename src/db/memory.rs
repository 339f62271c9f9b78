use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Datastore, StoreError, StoreResult};
use crate::models::{
    AuthenticatedIdentity, Channel, ChannelType, CreateOfferRequest, Membership, MembershipRecord,
    Offer, Role, UpdateOfferRequest, User, Workspace, WorkspaceSummary,
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    workspaces: HashMap<Uuid, Workspace>,
    memberships: Vec<Membership>,
    channels: Vec<Channel>,
    offers: HashMap<Uuid, Offer>,
}

/// In-memory datastore. The default backing store for development and the
/// fake used by the test suites; record-level operations are atomic under a
/// single RwLock.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove a user record, leaving any sessions that reference it dangling.
    /// Exists so tests can exercise the vanished-user path in the identity
    /// loader.
    pub async fn remove_user(&self, user_id: Uuid) {
        self.tables.write().await.users.remove(&user_id);
    }
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StoreError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn user_identity(&self, user_id: Uuid) -> StoreResult<Option<AuthenticatedIdentity>> {
        let tables = self.tables.read().await;
        let Some(user) = tables.users.get(&user_id) else {
            return Ok(None);
        };

        let memberships = tables
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                let workspace = tables.workspaces.get(&m.workspace_id)?;
                Some(MembershipRecord {
                    workspace: WorkspaceSummary {
                        id: workspace.id,
                        name: workspace.name.clone(),
                    },
                    role: m.role,
                })
            })
            .collect();

        Ok(Some(AuthenticatedIdentity {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            created_at: user.created_at,
            memberships,
        }))
    }

    async fn create_workspace(&self, owner_id: Uuid, name: &str) -> StoreResult<Workspace> {
        let mut tables = self.tables.write().await;
        let workspace = Workspace {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.workspaces.insert(workspace.id, workspace.clone());
        tables.memberships.push(Membership {
            user_id: owner_id,
            workspace_id: workspace.id,
            role: Role::Owner,
        });
        for channel_type in ChannelType::ALL {
            tables.channels.push(Channel {
                id: Uuid::new_v4(),
                workspace_id: workspace.id,
                name: channel_type.display_name().to_string(),
                channel_type,
                allocated_budget: 0,
            });
        }
        Ok(workspace)
    }

    async fn workspace_channels(&self, workspace_id: Uuid) -> StoreResult<Vec<Channel>> {
        let tables = self.tables.read().await;
        Ok(tables
            .channels
            .iter()
            .filter(|c| c.workspace_id == workspace_id)
            .cloned()
            .collect())
    }

    async fn list_offers(&self, workspace_id: Uuid) -> StoreResult<Vec<Offer>> {
        let tables = self.tables.read().await;
        let mut offers: Vec<Offer> = tables
            .offers
            .values()
            .filter(|o| o.workspace_id == workspace_id)
            .cloned()
            .collect();
        offers.sort_by_key(|o| o.created_at);
        Ok(offers)
    }

    async fn create_offer(
        &self,
        workspace_id: Uuid,
        request: CreateOfferRequest,
    ) -> StoreResult<Offer> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let offer = Offer {
            id: Uuid::new_v4(),
            workspace_id,
            title: request.title,
            description: request.description,
            status: request.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        tables.offers.insert(offer.id, offer.clone());
        Ok(offer)
    }

    async fn offer(&self, workspace_id: Uuid, offer_id: Uuid) -> StoreResult<Option<Offer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .offers
            .get(&offer_id)
            .filter(|o| o.workspace_id == workspace_id)
            .cloned())
    }

    async fn update_offer(
        &self,
        workspace_id: Uuid,
        offer_id: Uuid,
        changes: UpdateOfferRequest,
    ) -> StoreResult<Option<Offer>> {
        let mut tables = self.tables.write().await;
        let Some(offer) = tables
            .offers
            .get_mut(&offer_id)
            .filter(|o| o.workspace_id == workspace_id)
        else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            offer.title = title;
        }
        if let Some(description) = changes.description {
            offer.description = description;
        }
        if let Some(status) = changes.status {
            offer.status = status;
        }
        offer.updated_at = Utc::now();
        Ok(Some(offer.clone()))
    }

    async fn delete_offer(&self, workspace_id: Uuid, offer_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let matches = tables
            .offers
            .get(&offer_id)
            .is_some_and(|o| o.workspace_id == workspace_id);
        if matches {
            tables.offers.remove(&offer_id);
        }
        Ok(matches)
    }
}
