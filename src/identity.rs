//! Identity & Profile Collaborator
//!
//! Registration, login and profile storage live in an external service.
//! This crate only needs to resolve the current caller and read profiles.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{Caller, Role};
use crate::core_types::UserId;

/// Profile record owned by the identity service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: String,
    pub mobile_number: String,
    pub role: Role,
    /// Reported in statistics; not enforced as a login gate here
    #[serde(default)]
    pub is_approved: bool,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(UserId),

    #[error("Identity service unavailable: {0}")]
    Unavailable(String),
}

/// Identity service adapter
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    /// Resolve a session token to the caller; `None` if unknown or expired
    async fn current_user(&self, token: &str) -> Option<Caller>;

    async fn get_profile(&self, user_id: UserId) -> Result<Profile, IdentityError>;

    async fn list_profiles(&self) -> Result<Vec<Profile>, IdentityError>;
}

/// Static session and profile configuration entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticSession {
    pub token: String,
    #[serde(flatten)]
    pub profile: Profile,
}

/// In-process identity provider with fixed sessions
///
/// Used for development builds and tests.
#[derive(Debug, Default)]
pub struct StaticIdentity {
    sessions: DashMap<String, UserId>,
    profiles: DashMap<UserId, Profile>,
}

impl StaticIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sessions(sessions: &[StaticSession]) -> Self {
        let identity = Self::new();
        for s in sessions {
            identity.insert(&s.token, s.profile.clone());
        }
        identity
    }

    /// Register a profile reachable through `token`
    pub fn insert(&self, token: &str, profile: Profile) {
        self.sessions.insert(token.to_string(), profile.user_id);
        self.profiles.insert(profile.user_id, profile);
    }

    /// Register a profile without a session
    pub fn insert_profile(&self, profile: Profile) {
        self.profiles.insert(profile.user_id, profile);
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentity {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn current_user(&self, token: &str) -> Option<Caller> {
        let user_id = *self.sessions.get(token)?;
        let role = self.profiles.get(&user_id)?.role;
        Some(Caller { user_id, role })
    }

    async fn get_profile(&self, user_id: UserId) -> Result<Profile, IdentityError> {
        self.profiles
            .get(&user_id)
            .map(|p| p.value().clone())
            .ok_or(IdentityError::ProfileNotFound(user_id))
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, IdentityError> {
        Ok(self.profiles.iter().map(|p| p.value().clone()).collect())
    }
}
