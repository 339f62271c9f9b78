use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Membership role within a workspace. Registration only ever produces
/// `Owner`; the other variants exist for invited members and carry no
/// differentiated permissions yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

/// The fixed set of channel types seeded into every new workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    WarmOutreach,
    ColdOutreach,
    Content,
    PaidAds,
}

impl ChannelType {
    pub const ALL: [ChannelType; 4] = [
        ChannelType::WarmOutreach,
        ChannelType::ColdOutreach,
        ChannelType::Content,
        ChannelType::PaidAds,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ChannelType::WarmOutreach => "Warm Outreach",
            ChannelType::ColdOutreach => "Cold Outreach",
            ChannelType::Content => "Content",
            ChannelType::PaidAds => "Paid Ads",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    Draft,
    Active,
    Paused,
    Archived,
}

impl Default for OfferStatus {
    fn default() -> Self {
        OfferStatus::Draft
    }
}

/// User record as persisted. The password hash never leaves the store layer;
/// outward-facing responses go through [`UserResponse`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// (user, workspace, role) join record. A given pair appears at most once.
#[derive(Debug, Clone)]
pub struct Membership {
    pub user_id: Uuid,
    pub workspace_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub channel_type: ChannelType,
    pub allocated_budget: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workspace summary embedded in identity and membership listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSummary {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub workspace: WorkspaceSummary,
    pub role: Role,
}

/// Per-request expansion of a session into the full user plus membership
/// data. Built fresh by the identity loader on every request and carried as a
/// typed request extension; never persisted.
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub memberships: Vec<MembershipRecord>,
}

impl AuthenticatedIdentity {
    /// Membership lookup by exact workspace id string, no case folding.
    pub fn membership_for(&self, workspace_id: &str) -> Option<&MembershipRecord> {
        self.memberships
            .iter()
            .find(|m| m.workspace.id.to_string() == workspace_id)
    }
}

/// Registration request
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    pub workspace_name: Option<String>,
}

/// Login request
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// User as returned to clients: hash redacted, workspaces embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub workspaces: Vec<WorkspaceMembership>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceMembership {
    pub workspace_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl From<AuthenticatedIdentity> for UserResponse {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            id: identity.user_id,
            email: identity.email,
            name: identity.name,
            created_at: identity.created_at,
            workspaces: identity
                .memberships
                .into_iter()
                .map(|m| WorkspaceMembership {
                    workspace_id: m.workspace.id,
                    name: m.workspace.name,
                    role: m.role,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    #[validate(length(min = 1, max = 100, message = "name is required"))]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateOfferRequest {
    #[validate(length(min = 1, max = 200, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub description: String,
    #[serde(default)]
    pub status: Option<OfferStatus>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOfferRequest {
    #[validate(length(min = 1, max = 200, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub status: Option<OfferStatus>,
}
