use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use learnhub_core::{AppResult, CompanyId, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Maximum stored length of a role display name.
pub const ROLE_NAME_MAX_LENGTH: usize = 50;

/// Maximum stored length of a creator or updater name.
pub const ACTOR_NAME_MAX_LENGTH: usize = 20;

/// Unique identifier for a role record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(i64);

impl RoleId {
    /// Creates a role identifier from its stored integer value.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying integer value.
    #[must_use]
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Validated role display name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleName(NonEmptyString);

impl RoleName {
    /// Creates a trimmed role name of at most [`ROLE_NAME_MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::bounded(value, "role_name", ROLE_NAME_MAX_LENGTH).map(Self)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated name of the person creating or updating a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorName(NonEmptyString);

impl ActorName {
    /// Creates a trimmed actor name of at most [`ACTOR_NAME_MAX_LENGTH`] characters.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        NonEmptyString::bounded(value, "actor_name", ACTOR_NAME_MAX_LENGTH).map(Self)
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Named permission bundle scoped to a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub role_id: RoleId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub role_name: RoleName,
    /// Name of the creator.
    pub reg_by: ActorName,
    /// Name of the last updater.
    pub update_by: ActorName,
    /// Creation timestamp.
    pub reg_date: DateTime<Utc>,
    /// Last update timestamp.
    pub update_date: DateTime<Utc>,
    /// Soft-delete tombstone.
    pub del_date: Option<DateTime<Utc>>,
}

impl Role {
    /// Returns whether the role has not been soft-deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.del_date.is_none()
    }
}
