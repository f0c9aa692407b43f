//! Caller Identity
//!
//! Authentication happens upstream; by the time a request reaches a service the caller is
//! either a known user or an anonymous session.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

use crate::uuids::TypedUuid;

/// Marker for user identifiers.
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// Opaque token identifying an anonymous browsing session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// Who a cart belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartIdentity {
    User(UserUuid),
    Anonymous(SessionToken),
}

impl CartIdentity {
    pub(crate) fn user_uuid(&self) -> Option<UserUuid> {
        match self {
            Self::User(user) => Some(*user),
            Self::Anonymous(_) => None,
        }
    }

    pub(crate) fn session_token(&self) -> Option<&str> {
        match self {
            Self::User(_) => None,
            Self::Anonymous(token) => Some(token.as_str()),
        }
    }
}

/// Caller role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Admin,
}

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user: UserUuid,
    pub role: Role,
}

impl Caller {
    #[must_use]
    pub const fn customer(user: UserUuid) -> Self {
        Self {
            user,
            role: Role::Customer,
        }
    }

    #[must_use]
    pub const fn admin(user: UserUuid) -> Self {
        Self {
            user,
            role: Role::Admin,
        }
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether the caller may act on a resource owned by `owner`.
    #[must_use]
    pub fn can_access(&self, owner: UserUuid) -> bool {
        self.is_admin() || self.user == owner
    }
}
