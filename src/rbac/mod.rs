//! Role based access control
//!
//! - `types`: Template, role, user and resolved structures
//! - `template`: Permission template store and seeding
//! - `assignments`: Read side of role assignments and user/role indexes
//! - `users`: User directory
//! - `resolver`: Merges roles into the cached per-user views
//! - `roles`: Role administration and module/submodule/section assignment
//! - `authorization`: Action and role assignment, cached permission reads

pub mod assignments;
pub mod authorization;
pub mod resolver;
pub mod roles;
pub mod template;
pub mod types;
pub mod users;


pub use assignments::AssignmentStore;
pub use authorization::AuthorizationService;
pub use resolver::AccessResolver;
pub use roles::AccessService;
pub use template::{SeedReport, TemplateStore};
pub use types::*;
pub use users::UserDirectory;

use crate::events::{EventBus, EventClass, RoleEvent};
use crate::storage::keys;
use crate::utils::error::{AccessError, Result};

/// Dispatch one event per class for a completed mutation
///
/// Returns as soon as the events are handed to the bus.
pub(crate) fn announce(
    bus: &EventBus,
    role_id: &str,
    user_id: Option<&str>,
    classes: &[EventClass],
) {
    let events = classes
        .iter()
        .map(|&class| match user_id {
            Some(user_id) => RoleEvent::for_user(role_id, user_id, class),
            None => RoleEvent::new(role_id, class),
        })
        .collect();
    bus.dispatch(events);
}

/// Non-empty list of valid entity names
pub(crate) fn validate_list(kind: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Err(AccessError::validation(format!("no {}s given", kind)));
    }
    for name in names {
        keys::validate_name(kind, name)?;
    }
    Ok(())
}
