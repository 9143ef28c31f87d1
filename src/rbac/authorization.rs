//! Authorization
//!
//! Action assignment, role to user assignment and the cached permission
//! reads served at request time.

use super::assignments::AssignmentStore;
use super::resolver::AccessResolver;
use super::roles::{require_submodule, single};
use super::template::TemplateStore;
use super::types::{ModuleActions, ResolvedAccess, User};
use super::users::UserDirectory;
use super::announce;
use crate::events::{EventBus, EventClass};
use crate::storage::{KeyValueStore, SharedStore, WriteBatch, keys};
use crate::utils::error::{AccessError, Result};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct AuthorizationService {
    store: SharedStore,
    templates: TemplateStore,
    assignments: AssignmentStore,
    resolver: AccessResolver,
    users: UserDirectory,
    bus: EventBus,
}

impl AuthorizationService {
    pub fn new(
        store: SharedStore,
        templates: TemplateStore,
        assignments: AssignmentStore,
        resolver: AccessResolver,
        users: UserDirectory,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            templates,
            assignments,
            resolver,
            users,
            bus,
        }
    }

    pub async fn add_user(&self, user: &User) -> Result<()> {
        self.users.add_user(user).await
    }

    pub async fn user_by_id(&self, user_id: &str) -> Result<User> {
        self.users.user_by_id(user_id).await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<User> {
        self.users.user_by_email(email).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.users.list_users().await
    }

    pub async fn users_by_role(&self, role_id: &str) -> Result<Vec<User>> {
        self.assignments.require_role(role_id).await?;
        self.users.users_by_role(role_id).await
    }

    pub async fn is_valid_user(&self, user_id: &str) -> Result<bool> {
        self.users.is_valid_user(user_id).await
    }

    pub async fn assign_actions(
        &self,
        role_id: &str,
        module: &str,
        submodule: &str,
        actions: &[String],
    ) -> Result<()> {
        validate_actions(actions)?;
        self.assignments.require_role(role_id).await?;
        let template = self.templates.require_module(module).await?;
        let sub = require_submodule(&template, submodule)?;
        if let Some(missing) = actions.iter().find(|a| !sub.has_action(a)) {
            return Err(AccessError::not_found(format!(
                "action '{}' not found in {}/{}",
                missing, module, submodule
            )));
        }

        self.store
            .execute(single(|b| {
                b.set_add(
                    keys::role_actions(role_id, module, submodule),
                    actions.iter().cloned(),
                );
            }))
            .await?;

        info!(role_id = %role_id, module, submodule, ?actions, "Assigned actions");
        announce(&self.bus, role_id, None, &[EventClass::Action]);
        Ok(())
    }

    pub async fn unassign_actions(
        &self,
        role_id: &str,
        module: &str,
        submodule: &str,
        actions: &[String],
    ) -> Result<()> {
        keys::validate_name("module", module)?;
        keys::validate_name("submodule", submodule)?;
        validate_actions(actions)?;
        self.assignments.require_role(role_id).await?;

        self.store
            .execute(single(|b| {
                b.set_remove(
                    keys::role_actions(role_id, module, submodule),
                    actions.iter().cloned(),
                );
            }))
            .await?;

        info!(role_id = %role_id, module, submodule, ?actions, "Unassigned actions");
        announce(&self.bus, role_id, None, &[EventClass::Action]);
        Ok(())
    }

    /// Assigned actions of every assigned submodule of a role
    pub async fn actions_by_role(
        &self,
        role_id: &str,
    ) -> Result<BTreeMap<String, BTreeMap<String, Vec<String>>>> {
        self.assignments.require_role(role_id).await?;
        self.assignments.actions_by_role(role_id).await
    }

    /// Give a user a role, keeping both indexes in step
    pub async fn assign_role(&self, user_id: &str, role_id: &str) -> Result<()> {
        self.require_user(user_id).await?;
        self.assignments.require_role(role_id).await?;

        let mut batch = WriteBatch::new();
        batch
            .set_add(keys::user_roles(user_id), [role_id])
            .set_add(keys::role_users(role_id), [user_id]);
        self.store.execute(batch).await?;

        info!(user_id = %user_id, role_id = %role_id, "Assigned role");
        announce(&self.bus, role_id, Some(user_id), &EventClass::ALL);
        Ok(())
    }

    /// Take a role away from a user, keeping both indexes in step
    pub async fn unassign_role(&self, user_id: &str, role_id: &str) -> Result<()> {
        self.require_user(user_id).await?;
        self.assignments.require_role(role_id).await?;

        let mut batch = WriteBatch::new();
        batch
            .set_remove(keys::user_roles(user_id), [role_id])
            .set_remove(keys::role_users(role_id), [user_id]);
        self.store.execute(batch).await?;

        info!(user_id = %user_id, role_id = %role_id, "Unassigned role");
        announce(&self.bus, role_id, Some(user_id), &EventClass::ALL);
        Ok(())
    }

    /// Cached access tree of a user
    pub async fn access_list(&self, user_id: &str) -> Result<ResolvedAccess> {
        self.resolver.access_list(user_id).await
    }

    /// Cached actions of a user within one module
    pub async fn action_list_by_module(&self, module: &str, user_id: &str) -> Result<ModuleActions> {
        self.resolver.action_list_by_module(module, user_id).await
    }

    /// Answer from the flattened permission set, never recomputing
    pub async fn check_permission(&self, user_id: &str, permission: &str) -> Result<bool> {
        let allowed = self.resolver.check_permission(user_id, permission).await?;
        debug!(user_id = %user_id, permission, allowed, "Permission check");
        Ok(allowed)
    }

    async fn require_user(&self, user_id: &str) -> Result<()> {
        if self.users.is_valid_user(user_id).await? {
            Ok(())
        } else {
            Err(AccessError::not_found(format!("user '{}' not found", user_id)))
        }
    }
}

/// Action names carry `:` by convention, so only emptiness is checked
fn validate_actions(actions: &[String]) -> Result<()> {
    if actions.is_empty() {
        return Err(AccessError::validation("no actions given"));
    }
    if actions.iter().any(|a| a.trim().is_empty()) {
        return Err(AccessError::validation("action name cannot be empty"));
    }
    Ok(())
}
