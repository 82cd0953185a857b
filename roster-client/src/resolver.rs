//! Person resolver
//!
//! Turns a people-picker selection into a directory user id:
//!
//! 1. pick an identifier from the selection, trying candidate fields in a
//!    fixed order ([`IdentifierStrategy`]);
//! 2. ask the directory to ensure the user exists and return its id.
//!
//! Failure at either step leaves the person reference out. It never fails
//! the write that needed it.

use std::fmt;

use shared::{DirectoryUser, PickerSelection};

use crate::service::DirectoryService;

/// One way of getting an identifier out of a picker selection
pub trait IdentifierCandidate: Send + Sync + fmt::Debug {
    /// Name used in logs
    fn name(&self) -> &'static str;

    /// The identifier, if this candidate finds a non-blank one
    fn extract<'a>(&self, selection: &'a PickerSelection) -> Option<&'a str>;
}

/// Built-in candidates, one per picker field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerField {
    LoginName,
    Key,
    Id,
    SecondaryText,
    Email,
    Text,
}

impl PickerField {
    /// Default probing order: logins and keys before display text
    pub const DEFAULT_ORDER: [PickerField; 6] = [
        PickerField::LoginName,
        PickerField::Key,
        PickerField::Id,
        PickerField::SecondaryText,
        PickerField::Email,
        PickerField::Text,
    ];
}

impl IdentifierCandidate for PickerField {
    fn name(&self) -> &'static str {
        match self {
            Self::LoginName => "loginName",
            Self::Key => "key",
            Self::Id => "id",
            Self::SecondaryText => "secondaryText",
            Self::Email => "email",
            Self::Text => "text",
        }
    }

    fn extract<'a>(&self, selection: &'a PickerSelection) -> Option<&'a str> {
        let value = match self {
            Self::LoginName => &selection.login_name,
            Self::Key => &selection.key,
            Self::Id => &selection.id,
            Self::SecondaryText => &selection.secondary_text,
            Self::Email => &selection.email,
            Self::Text => &selection.text,
        };
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Ordered identifier candidates; the first hit wins
#[derive(Debug)]
pub struct IdentifierStrategy {
    candidates: Vec<Box<dyn IdentifierCandidate>>,
}

impl Default for IdentifierStrategy {
    fn default() -> Self {
        Self::new(
            PickerField::DEFAULT_ORDER
                .into_iter()
                .map(|f| Box::new(f) as Box<dyn IdentifierCandidate>)
                .collect(),
        )
    }
}

impl IdentifierStrategy {
    pub fn new(candidates: Vec<Box<dyn IdentifierCandidate>>) -> Self {
        Self { candidates }
    }

    /// Candidate names in probing order
    pub fn order(&self) -> Vec<&'static str> {
        self.candidates.iter().map(|c| c.name()).collect()
    }

    /// First identifier found, with the name of the candidate that found it
    pub fn extract<'a>(&self, selection: &'a PickerSelection) -> Option<(&'static str, &'a str)> {
        self.candidates
            .iter()
            .find_map(|c| c.extract(selection).map(|v| (c.name(), v)))
    }
}

/// Why a selection produced no person reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    /// No candidate field held a value
    NoIdentifier,
    /// The directory rejected or could not answer for the identifier
    Directory { identifier: String, message: String },
}

/// Person field state
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Resolution {
    #[default]
    Unselected,
    Selected(PickerSelection),
    Resolved {
        selection: PickerSelection,
        identifier: String,
        user: DirectoryUser,
    },
    Failed {
        selection: PickerSelection,
        reason: ResolveFailure,
    },
}

impl Resolution {
    /// State for the first item of a picker result
    pub fn from_selection(selection: Option<PickerSelection>) -> Self {
        selection.map_or(Self::Unselected, Self::Selected)
    }

    /// Directory id to write, only when resolved
    pub fn person_id(&self) -> Option<i64> {
        match self {
            Self::Resolved { user, .. } => Some(user.id),
            _ => None,
        }
    }

    pub fn user(&self) -> Option<&DirectoryUser> {
        match self {
            Self::Resolved { user, .. } => Some(user),
            _ => None,
        }
    }
}

/// Resolves picker selections against a directory
#[derive(Debug)]
pub struct PersonResolver<D> {
    directory: D,
    strategy: IdentifierStrategy,
}

impl<D: DirectoryService> PersonResolver<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            strategy: IdentifierStrategy::default(),
        }
    }

    /// Replace the identifier probing order
    pub fn with_strategy(mut self, strategy: IdentifierStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn strategy(&self) -> &IdentifierStrategy {
        &self.strategy
    }

    /// Best-effort identifier of the selected person
    pub fn extract_identifier<'a>(&self, selection: &'a PickerSelection) -> Option<&'a str> {
        self.strategy.extract(selection).map(|(_, v)| v)
    }

    /// Ensure `identifier` exists in the directory.
    ///
    /// Errors are logged and reported as `None`.
    pub async fn resolve(&self, identifier: &str) -> Option<DirectoryUser> {
        self.try_resolve(identifier).await.ok()
    }

    async fn try_resolve(&self, identifier: &str) -> Result<DirectoryUser, String> {
        if identifier.trim().is_empty() {
            return Err("empty identifier".into());
        }
        match self.directory.ensure_user(identifier).await {
            Ok(user) => {
                tracing::debug!(identifier, user_id = user.id, "Resolved person");
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(identifier, error = %e, "ensure_user failed");
                Err(e.to_string())
            }
        }
    }

    /// Advance a `Selected` state to `Resolved` or `Failed`.
    ///
    /// Other states are returned unchanged.
    pub async fn resolve_selection(&self, state: Resolution) -> Resolution {
        let Resolution::Selected(selection) = state else {
            return state;
        };

        let Some((candidate, identifier)) = self.strategy.extract(&selection) else {
            tracing::warn!("Selected person has no usable identifier, skipping person field");
            return Resolution::Failed {
                selection,
                reason: ResolveFailure::NoIdentifier,
            };
        };
        let identifier = identifier.to_string();
        tracing::debug!(candidate, %identifier, "Extracted person identifier");

        match self.try_resolve(&identifier).await {
            Ok(user) => Resolution::Resolved {
                selection,
                identifier,
                user,
            },
            Err(message) => {
                tracing::warn!(
                    %identifier,
                    "Could not resolve selected person to a directory id, skipping person field"
                );
                Resolution::Failed {
                    selection,
                    reason: ResolveFailure::Directory { identifier, message },
                }
            }
        }
    }
}
