use shopfront_core::UserId;
use shopfront_domain::UserAddress;

use crate::Identified;

impl Identified for UserAddress {
    fn resource_id(&self) -> String {
        self.id.to_string()
    }
}

/// Boundary payload for address creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserAddressInput {
    /// Owning user, resolved from the subject.
    pub user_id: UserId,
    /// Street address including house number.
    pub full_address: String,
    /// Township name.
    pub township: String,
    /// Region name.
    pub region: String,
    /// Contact phone number.
    pub phone: String,
    /// Whether this becomes the user's default address.
    pub is_default: bool,
}

/// Boundary payload for address updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAddressPatch {
    /// New street address.
    pub full_address: String,
    /// New township name.
    pub township: String,
    /// New region name.
    pub region: String,
    /// New contact phone number.
    pub phone: String,
    /// New default flag.
    pub is_default: bool,
}

/// Typed filter for address queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserAddressFilter {
    /// Restrict to one owning user.
    pub user_id: Option<UserId>,
}
