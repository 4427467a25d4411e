use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopfront_core::{ProviderId, Role, Subject, UserId};

/// User account row projection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Role consulted by the permission tables.
    pub role: Role,
    /// Provider binding for shop owners.
    pub provider_id: Option<ProviderId>,
    /// Whether the user bypasses role and scope checks.
    pub is_superuser: bool,
    /// Whether the user is blocked by an administrator.
    pub is_blocked: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Builds the request subject for this account.
    #[must_use]
    pub fn subject(&self) -> Subject {
        Subject::new(
            self.id,
            self.role,
            self.provider_id,
            self.is_superuser,
            self.is_blocked,
        )
    }
}
