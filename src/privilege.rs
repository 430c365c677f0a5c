//! Per-model authorization of admin actions.

use crate::config::AdminModel;
use crate::error::AdminError;
use crate::extractors::AdminUser;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Listing and detail views.
    Index,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Index, Action::Create, Action::Edit, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
        }
    }
}

/// Decides whether a user may perform an action on a model.
pub trait PrivilegeChecker: Send + Sync {
    fn has_privilege(&self, user: &AdminUser, model: &AdminModel, action: Action) -> bool;
}

/// Grants exactly the privileges listed in the model's config, to everyone.
#[derive(Clone, Copy, Debug, Default)]
pub struct ModelPrivileges;

impl PrivilegeChecker for ModelPrivileges {
    fn has_privilege(&self, _user: &AdminUser, model: &AdminModel, action: Action) -> bool {
        model.allows(action)
    }
}

pub fn ensure_privilege(
    checker: &dyn PrivilegeChecker,
    user: &AdminUser,
    model: &AdminModel,
    action: Action,
) -> Result<(), AdminError> {
    if checker.has_privilege(user, model, action) {
        return Ok(());
    }
    tracing::warn!(
        user = user.name().unwrap_or("anonymous"),
        model = %model.alias,
        action = action.as_str(),
        "privilege denied"
    );
    Err(AdminError::Forbidden(format!(
        "{} not allowed on {}",
        action.as_str(),
        model.alias
    )))
}
