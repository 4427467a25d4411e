use shopfront_core::{AppError, AppResult, ProviderId, Subject};

/// Tenant-scope filter built once from the subject and threaded into every
/// query instead of being re-derived per resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopePredicate {
    /// No ownership filter; superusers and anonymous storefront reads.
    Unrestricted,
    /// Restricted to resources owned by one provider or to unowned resources.
    Provider(ProviderId),
}

impl ScopePredicate {
    /// Builds the scope for a request subject.
    ///
    /// Superusers and subjects without a provider binding see everything;
    /// provider-bound subjects only see their own provider's resources.
    #[must_use]
    pub fn for_subject(subject: Option<&Subject>) -> Self {
        match subject {
            Some(subject) if !subject.is_superuser() => match subject.provider_id() {
                Some(provider_id) => Self::Provider(provider_id),
                None => Self::Unrestricted,
            },
            _ => Self::Unrestricted,
        }
    }

    /// Returns the provider filter value for query parameter binding.
    #[must_use]
    pub fn provider_filter(&self) -> Option<ProviderId> {
        match self {
            Self::Unrestricted => None,
            Self::Provider(provider_id) => Some(*provider_id),
        }
    }

    /// Returns whether a resource with the given owner is inside the scope.
    ///
    /// Unowned resources are visible to every scope.
    #[must_use]
    pub fn allows(&self, owner: Option<ProviderId>) -> bool {
        match (self, owner) {
            (Self::Unrestricted, _) | (_, None) => true,
            (Self::Provider(provider_id), Some(owner)) => *provider_id == owner,
        }
    }

    /// Ensures a resource owner is inside the scope.
    pub fn ensure_owned(&self, owner: Option<ProviderId>) -> AppResult<()> {
        if self.allows(owner) {
            return Ok(());
        }

        Err(AppError::Forbidden(
            "resource belongs to another provider".to_owned(),
        ))
    }
}
