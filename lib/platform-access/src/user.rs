//! User domain type and registration contract.
//!
//! Users are identified by the chat platform's numeric id. There is no
//! separate sign-up: the first message from an unknown id registers the
//! user, and later contacts refresh the profile fields the transport
//! supplies.

use crate::error::AccessError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use linklet_core::{OwnerId, Result};
use serde::{Deserialize, Serialize};

/// Identity fields as the transport delivers them with each request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Platform user id.
    pub id: OwnerId,
    /// Platform username, if set.
    pub username: Option<String>,
    /// First name, if shared.
    pub first_name: Option<String>,
}

impl UserProfile {
    /// Creates a profile with only an id.
    #[must_use]
    pub fn new(id: OwnerId) -> Self {
        Self {
            id,
            username: None,
            first_name: None,
        }
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the first name.
    #[must_use]
    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }
}

/// A registered user of the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Platform user id.
    id: OwnerId,
    /// Platform username, if known.
    username: Option<String>,
    /// First name, if known.
    first_name: Option<String>,
    /// When the user was first seen.
    created_at: DateTime<Utc>,
    /// When the profile fields last changed.
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user from a transport profile.
    #[must_use]
    pub fn new(profile: &UserProfile) -> Self {
        let now = Utc::now();
        Self {
            id: profile.id,
            username: profile.username.clone(),
            first_name: profile.first_name.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitutes a user from storage.
    #[must_use]
    pub fn with_all_fields(
        id: OwnerId,
        username: Option<String>,
        first_name: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            first_name,
            created_at,
            updated_at,
        }
    }

    /// Returns the platform user id.
    #[must_use]
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Returns the username, if known.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Returns the first name, if known.
    #[must_use]
    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    /// Returns when the user was first seen.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the profile last changed.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Registration and lookup of users.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Registers the user on first contact, or refreshes the stored
    /// profile fields, and returns the record.
    async fn ensure_registered(&self, profile: &UserProfile) -> Result<User, AccessError>;

    /// Looks up a user by id.
    async fn find(&self, id: OwnerId) -> Result<Option<User>, AccessError>;
}
