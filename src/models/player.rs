//! Principal (authenticated caller) and Player (lobby membership) data structures.

use serde::{Deserialize, Serialize};

/// Opaque user identity, issued by the identity provider.
pub type UserId = String;

/// Role of an authenticated caller. Admins run the tournament but never play in it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

/// Authenticated caller as supplied by the identity provider. The core trusts
/// this struct and performs its own role checks on top of it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub image_url: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Identity collaborator: resolves a bearer token to an authenticated
/// principal. The core never sees credentials, only the result.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<Principal>;
}

/// A player in the lobby. Created on join, removed on leave/kick, gone after reset.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub user_id: UserId,
    pub username: String,
    pub image_url: String,
    pub role: Role,
    pub is_ready: bool,
    /// Epoch ms at join time; roster ordering key.
    pub joined_at: i64,
}

impl Player {
    /// Build a lobby entry for a principal. Starts not-ready.
    pub fn from_principal(principal: &Principal, joined_at: i64) -> Self {
        Self {
            user_id: principal.user_id.clone(),
            username: principal.username.clone(),
            image_url: principal.image_url.clone(),
            role: principal.role,
            is_ready: false,
            joined_at,
        }
    }
}
