use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The principal text of the anonymous, unauthenticated caller.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Identity of the authenticated caller as issued by the identity provider.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
#[serde(transparent)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(principal: impl Into<String>) -> Self {
        Self(principal.into())
    }

    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CallerId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.trim()))
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct PatientProfile {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    User,
    Guest,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown role '{0}', expected admin, user or guest")]
pub struct ParseUserRoleError(String);

impl UserRole {
    /// Resolves a caller's role: explicit assignments win, otherwise a
    /// registered profile makes the caller a `User`.
    pub fn resolve(assigned: Option<UserRole>, has_profile: bool) -> Self {
        match assigned {
            Some(role) => role,
            None if has_profile => UserRole::User,
            None => UserRole::Guest,
        }
    }

    pub fn can_book(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::User)
    }

    pub fn is_admin(&self) -> bool {
        *self == UserRole::Admin
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
            UserRole::Guest => "guest",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ParseUserRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "user" => Ok(UserRole::User),
            "guest" => Ok(UserRole::Guest),
            _ => Err(ParseUserRoleError(s.to_string())),
        }
    }
}
