//! Key layout
//!
//! Every key the engine touches is built here. Entity identifiers and
//! module/submodule/section names may not contain `:`, so the namespaces
//! below cannot collide.

use crate::utils::error::{AccessError, Result};

/// Prefix shared by all permission template keys
pub const CONFIG_PREFIX: &str = "config:";
/// Prefix of per-module template entries
pub const TEMPLATE_PREFIX: &str = "config:access:";
/// Flag set once the template has been seeded
pub const TEMPLATE_SEEDED: &str = "config:isset";

/// Hash of role id to role name
pub const ROLES: &str = "roles";
/// Counter backing role id generation
pub const ROLE_SEQUENCE: &str = "roles:seq";
/// Hash of user email to user id
pub const USERS: &str = "users";

const SEPARATOR: char = ':';

/// Reject names that would break the key layout
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AccessError::validation(format!("{} cannot be empty", kind)));
    }
    if name.contains(SEPARATOR) {
        return Err(AccessError::validation(format!(
            "{} '{}' cannot contain '{}'",
            kind, name, SEPARATOR
        )));
    }
    Ok(())
}

pub fn template(module: &str) -> String {
    format!("{}{}", TEMPLATE_PREFIX, module)
}

pub fn role_modules(role_id: &str) -> String {
    format!("role:{}:mo", role_id)
}

pub fn role_submodules(role_id: &str, module: &str) -> String {
    format!("role:{}:sm:{}", role_id, module)
}

pub fn role_sections(role_id: &str, module: &str, submodule: &str) -> String {
    format!("role:{}:se:{}:{}", role_id, module, submodule)
}

pub fn role_actions(role_id: &str, module: &str, submodule: &str) -> String {
    format!("role:{}:ac:{}:{}", role_id, module, submodule)
}

/// Prefix covering every assignment key owned by a role
pub fn role_namespace(role_id: &str) -> String {
    format!("role:{}:", role_id)
}

/// Users holding a role
pub fn role_users(role_id: &str) -> String {
    format!("roleuser:{}", role_id)
}

/// Roles held by a user
pub fn user_roles(user_id: &str) -> String {
    format!("userrole:{}", user_id)
}

pub fn user(user_id: &str) -> String {
    format!("user:{}", user_id)
}

/// Cached resolved access tree
pub fn access_list(user_id: &str) -> String {
    format!("access:{}", user_id)
}

/// Cached resolved actions for one module
pub fn module_actions(user_id: &str, module: &str) -> String {
    format!("actions:{}:{}", user_id, module)
}

/// Prefix covering every cached per-module action entry of a user
pub fn module_actions_prefix(user_id: &str) -> String {
    format!("actions:{}:", user_id)
}

/// Flattened permission set used by permission checks
pub fn permission_set(user_id: &str) -> String {
    format!("actionlist:{}", user_id)
}

pub fn session(token_uuid: &str) -> String {
    format!("session:{}", token_uuid)
}
