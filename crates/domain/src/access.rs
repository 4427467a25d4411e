use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shopfront_core::{AppError, AppResult, Role, Subject};

/// CRUD actions gated by the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Creates a new resource.
    Create,
    /// Reads one or many resources.
    Read,
    /// Updates an existing resource.
    Update,
    /// Deletes one or many resources.
    Delete,
}

impl Action {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            _ => Err(AppError::Validation(format!(
                "unknown action value '{value}'"
            ))),
        }
    }
}

/// Closed set of manageable resource types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Catalog product.
    Product,
    /// Customer order.
    Order,
    /// Catalog category.
    Category,
    /// Time-bound sales category.
    SalesCategory,
    /// Product brand.
    Brand,
    /// Geographic region.
    Region,
    /// Township within a region.
    Township,
    /// Customer delivery or billing address.
    UserAddress,
    /// Provider pickup address.
    PickupAddress,
    /// Role definition.
    Role,
    /// Permission definition.
    Permission,
    /// User account.
    User,
    /// Sign-in access log entry.
    AccessLog,
    /// Audit log entry.
    AuditLog,
}

impl ResourceKind {
    /// Returns a stable storage value for this resource kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Order => "order",
            Self::Category => "category",
            Self::SalesCategory => "sales_category",
            Self::Brand => "brand",
            Self::Region => "region",
            Self::Township => "township",
            Self::UserAddress => "user_address",
            Self::PickupAddress => "pickup_address",
            Self::Role => "role",
            Self::Permission => "permission",
            Self::User => "user",
            Self::AccessLog => "access_log",
            Self::AuditLog => "audit_log",
        }
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "product" => Ok(Self::Product),
            "order" => Ok(Self::Order),
            "category" => Ok(Self::Category),
            "sales_category" => Ok(Self::SalesCategory),
            "brand" => Ok(Self::Brand),
            "region" => Ok(Self::Region),
            "township" => Ok(Self::Township),
            "user_address" => Ok(Self::UserAddress),
            "pickup_address" => Ok(Self::PickupAddress),
            "role" => Ok(Self::Role),
            "permission" => Ok(Self::Permission),
            "user" => Ok(Self::User),
            "access_log" => Ok(Self::AccessLog),
            "audit_log" => Ok(Self::AuditLog),
            _ => Err(AppError::Validation(format!(
                "unknown resource kind '{value}'"
            ))),
        }
    }
}

/// Role set allowed to perform one action on a resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessRule {
    /// Allowed for any subject, authenticated or anonymous.
    Anyone,
    /// Allowed only for authenticated subjects holding one of the roles.
    Roles(&'static [Role]),
}

/// Per-resource mapping from action to allowed role set.
///
/// The table is total by construction: `for_resource` matches exhaustively
/// over the closed [`ResourceKind`] enum, so a resource without a rule cannot
/// exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionRule {
    create: AccessRule,
    read: AccessRule,
    update: AccessRule,
    delete: AccessRule,
}

const ADMIN: &[Role] = &[Role::Admin];
const ADMIN_SHOPOWNER: &[Role] = &[Role::Admin, Role::Shopowner];
const AUTHENTICATED: &[Role] = &[Role::Admin, Role::Shopowner, Role::Customer];

impl PermissionRule {
    /// Returns the permission rule registered for a resource kind.
    #[must_use]
    pub fn for_resource(resource: ResourceKind) -> Self {
        match resource {
            ResourceKind::Product => Self {
                create: AccessRule::Roles(ADMIN_SHOPOWNER),
                read: AccessRule::Anyone,
                update: AccessRule::Roles(ADMIN_SHOPOWNER),
                delete: AccessRule::Roles(ADMIN_SHOPOWNER),
            },
            ResourceKind::Order => Self {
                create: AccessRule::Anyone,
                read: AccessRule::Anyone,
                update: AccessRule::Roles(ADMIN_SHOPOWNER),
                delete: AccessRule::Roles(ADMIN),
            },
            ResourceKind::Category | ResourceKind::SalesCategory => Self {
                create: AccessRule::Roles(ADMIN_SHOPOWNER),
                read: AccessRule::Anyone,
                update: AccessRule::Roles(ADMIN_SHOPOWNER),
                delete: AccessRule::Roles(ADMIN),
            },
            ResourceKind::Brand | ResourceKind::Region | ResourceKind::Township => Self {
                create: AccessRule::Roles(ADMIN),
                read: AccessRule::Anyone,
                update: AccessRule::Roles(ADMIN),
                delete: AccessRule::Roles(ADMIN),
            },
            ResourceKind::UserAddress | ResourceKind::PickupAddress => Self {
                create: AccessRule::Roles(AUTHENTICATED),
                read: AccessRule::Roles(AUTHENTICATED),
                update: AccessRule::Roles(AUTHENTICATED),
                delete: AccessRule::Roles(AUTHENTICATED),
            },
            ResourceKind::Role | ResourceKind::Permission | ResourceKind::User => Self {
                create: AccessRule::Roles(ADMIN),
                read: AccessRule::Roles(ADMIN),
                update: AccessRule::Roles(ADMIN),
                delete: AccessRule::Roles(ADMIN),
            },
            ResourceKind::AccessLog => Self {
                create: AccessRule::Roles(ADMIN),
                read: AccessRule::Roles(AUTHENTICATED),
                update: AccessRule::Roles(ADMIN),
                delete: AccessRule::Roles(AUTHENTICATED),
            },
            ResourceKind::AuditLog => Self {
                create: AccessRule::Roles(ADMIN),
                read: AccessRule::Roles(ADMIN_SHOPOWNER),
                update: AccessRule::Roles(ADMIN),
                delete: AccessRule::Roles(ADMIN),
            },
        }
    }

    /// Returns the role set allowed to perform one action.
    #[must_use]
    pub fn rule_for(&self, action: Action) -> AccessRule {
        match action {
            Action::Create => self.create,
            Action::Read => self.read,
            Action::Update => self.update,
            Action::Delete => self.delete,
        }
    }
}

/// Decides whether a subject may perform an action on a resource kind.
///
/// A blocked subject is denied before the rule table is consulted; reading
/// one's own profile does not pass through this evaluator. Tenant ownership
/// is a separate refinement applied by callers through [`crate::ScopePredicate`].
pub fn check_permission(
    subject: Option<&Subject>,
    resource: ResourceKind,
    action: Action,
) -> AppResult<()> {
    if subject.is_some_and(Subject::is_blocked) {
        return Err(AppError::Forbidden(
            "blocked subjects cannot perform this action".to_owned(),
        ));
    }

    match PermissionRule::for_resource(resource).rule_for(action) {
        AccessRule::Anyone => Ok(()),
        AccessRule::Roles(roles) => {
            let subject = subject.ok_or_else(|| {
                AppError::Unauthorized(format!(
                    "authentication required to {} {}",
                    action.as_str(),
                    resource.as_str()
                ))
            })?;

            if subject.is_superuser() || roles.contains(&subject.role()) {
                return Ok(());
            }

            Err(AppError::Forbidden(format!(
                "role '{}' may not {} {}",
                subject.role().as_str(),
                action.as_str(),
                resource.as_str()
            )))
        }
    }
}
