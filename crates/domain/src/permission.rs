use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use learnhub_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::RoleId;

/// Maximum stored length of a grant type code.
pub const GRANT_TYPE_MAX_LENGTH: usize = 10;

/// Identifier of an externally defined permission (a portal screen or action).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionId(i64);

impl PermissionId {
    /// Creates a permission identifier from its stored integer value.
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

impl Display for PermissionId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Kind of access a role has to a permission, stored as a short code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GrantType(String);

impl GrantType {
    /// Creates a validated grant type code.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "grant_type must not be empty".to_owned(),
            ));
        }

        if trimmed.chars().count() > GRANT_TYPE_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "grant_type '{trimmed}' must be at most {GRANT_TYPE_MAX_LENGTH} characters"
            )));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::Validation(format!(
                "grant_type '{trimmed}' must not contain whitespace"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the stable storage value for this grant type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for GrantType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl TryFrom<String> for GrantType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GrantType> for String {
    fn from(value: GrantType) -> Self {
        value.0
    }
}

impl Display for GrantType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// A `(permission, grant type)` pair held by a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PermissionGrant {
    /// Granted permission.
    pub permission_id: PermissionId,
    /// Kind of access granted.
    pub grant_type: GrantType,
}

impl PermissionGrant {
    /// Creates a grant pair.
    #[must_use]
    pub fn new(permission_id: PermissionId, grant_type: GrantType) -> Self {
        Self {
            permission_id,
            grant_type,
        }
    }
}

/// Persisted role-permission association row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    /// Owning role.
    pub role_id: RoleId,
    /// Granted permission and access kind.
    pub grant: PermissionGrant,
    /// Creation timestamp.
    pub reg_date: DateTime<Utc>,
    /// Last update timestamp.
    pub update_date: DateTime<Utc>,
    /// Soft-delete tombstone.
    pub del_date: Option<DateTime<Utc>>,
}

impl RolePermission {
    /// Returns whether the row has not been soft-deleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.del_date.is_none()
    }
}

/// Read-only catalog entry describing a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDefinition {
    /// Permission identifier.
    pub permission_id: PermissionId,
    /// Menu the permission belongs to.
    pub menu_name: String,
    /// Human-readable screen name.
    pub display_name: String,
}

/// Desired grant set for one role, at most one grant type per permission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredGrants(Vec<PermissionGrant>);

impl DesiredGrants {
    /// Builds a desired grant set from caller input.
    ///
    /// Identical pairs collapse into one. Two different grant types for the same
    /// permission are rejected.
    pub fn new(grants: impl IntoIterator<Item = PermissionGrant>) -> AppResult<Self> {
        let mut by_permission: BTreeMap<PermissionId, GrantType> = BTreeMap::new();

        for grant in grants {
            match by_permission.get(&grant.permission_id) {
                Some(stored) if stored == &grant.grant_type => {}
                Some(stored) => {
                    return Err(AppError::Validation(format!(
                        "permission '{}' is granted twice with conflicting grant types '{}' and '{}'",
                        grant.permission_id, stored, grant.grant_type
                    )));
                }
                None => {
                    by_permission.insert(grant.permission_id, grant.grant_type);
                }
            }
        }

        Ok(Self(
            by_permission
                .into_iter()
                .map(|(permission_id, grant_type)| PermissionGrant::new(permission_id, grant_type))
                .collect(),
        ))
    }

    /// Returns grants ordered by permission identifier.
    #[must_use]
    pub fn as_slice(&self) -> &[PermissionGrant] {
        self.0.as_slice()
    }

    /// Returns the number of distinct permissions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no permission is granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the set and returns the ordered grants.
    #[must_use]
    pub fn into_vec(self) -> Vec<PermissionGrant> {
        self.0
    }
}
