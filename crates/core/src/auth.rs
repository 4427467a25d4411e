use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{AppError, ProviderId, UserId};

/// Roles recognised by the permission tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform administrator.
    Admin,
    /// Shop owner managing provider-scoped resources.
    Shopowner,
    /// Storefront customer.
    Customer,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Shopowner => "shopowner",
            Self::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "shopowner" => Ok(Self::Shopowner),
            "customer" => Ok(Self::Customer),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Authenticated actor resolved from the session for the duration of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: UserId,
    role: Role,
    provider_id: Option<ProviderId>,
    superuser: bool,
    blocked: bool,
}

impl Subject {
    /// Creates a subject from verified session data.
    #[must_use]
    pub fn new(
        id: UserId,
        role: Role,
        provider_id: Option<ProviderId>,
        superuser: bool,
        blocked: bool,
    ) -> Self {
        Self {
            id,
            role,
            provider_id,
            superuser,
            blocked,
        }
    }

    /// Returns the stable user identifier.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the subject role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the provider the subject belongs to, if any.
    #[must_use]
    pub fn provider_id(&self) -> Option<ProviderId> {
        self.provider_id
    }

    /// Returns whether the subject bypasses role and scope checks.
    #[must_use]
    pub fn is_superuser(&self) -> bool {
        self.superuser
    }

    /// Returns whether the subject is blocked by an administrator.
    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }
}
