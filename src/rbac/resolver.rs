//! Access-list resolver
//!
//! Merges a user's roles into the cached access tree, the per-module action
//! lists and the flattened permission set. Roles are applied in ascending id
//! order and a later role replaces an earlier role's entry for the same
//! module wholesale.
//!
//! Every recomputation reads all of its inputs first and then writes the
//! result in one batch, so a failed read never leaves a half written cache.

use super::assignments::AssignmentStore;
use super::template::TemplateStore;
use super::types::*;
use crate::storage::{KeyValueStore, SharedStore, WriteBatch, keys};
use crate::utils::error::{AccessError, Result};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

/// Overlay one role's assignments onto a module of the template
pub fn overlay_access(module: &Module, role: &RoleAssignments) -> ModuleAccess {
    let submodules = module
        .submodules
        .iter()
        .map(|sub| {
            let granted = role.has_submodule(&module.name, &sub.name);
            let assigned = role.sections_of(&module.name, &sub.name);
            let sections = sub
                .sections
                .iter()
                .map(|section| (section.clone(), granted && assigned.contains(section)))
                .collect();
            SubModuleAccess {
                name: sub.name.clone(),
                access: granted,
                sections,
            }
        })
        .collect();

    ModuleAccess {
        access: true,
        submodules,
    }
}

/// Overlay one role's action assignments onto a module of the template
///
/// Submodules the role does not grant carry no actions at all.
pub fn overlay_actions(module: &Module, role: &RoleAssignments) -> ModuleActions {
    let submodules = module
        .submodules
        .iter()
        .map(|sub| {
            let actions = if role.has_submodule(&module.name, &sub.name) {
                let assigned = role.actions_of(&module.name, &sub.name);
                sub.actions
                    .iter()
                    .map(|action| {
                        let grant = ActionGrant {
                            title: action.title.clone(),
                            allowed: assigned.contains(&action.name),
                        };
                        (action.name.clone(), grant)
                    })
                    .collect()
            } else {
                BTreeMap::new()
            };
            SubModuleActions {
                name: sub.name.clone(),
                actions,
            }
        })
        .collect();

    ModuleActions { submodules }
}

/// Permission strings a role grants through assigned modules and submodules
pub fn granted_permissions(role: &RoleAssignments) -> BTreeSet<String> {
    let mut granted = BTreeSet::new();
    for module in &role.modules {
        if let Some(subs) = role.actions.get(module) {
            for (sub, actions) in subs {
                if role.has_submodule(module, sub) {
                    granted.extend(actions.iter().cloned());
                }
            }
        }
    }
    granted
}

#[derive(Debug, Clone)]
pub struct AccessResolver {
    store: SharedStore,
    templates: TemplateStore,
    assignments: AssignmentStore,
}

/// Template modules fetched once per recomputation
#[derive(Default)]
struct TemplateCache {
    modules: HashMap<String, Option<Module>>,
}

impl TemplateCache {
    async fn get(&mut self, templates: &TemplateStore, name: &str) -> Result<Option<&Module>> {
        if !self.modules.contains_key(name) {
            let module = templates.module(name).await?;
            if module.is_none() {
                debug!("Skipping module {} missing from the template", name);
            }
            self.modules.insert(name.to_string(), module);
        }
        Ok(self.modules.get(name).and_then(Option::as_ref))
    }
}

impl AccessResolver {
    pub fn new(store: SharedStore, templates: TemplateStore, assignments: AssignmentStore) -> Self {
        Self {
            store,
            templates,
            assignments,
        }
    }

    async fn load_roles(&self, user_id: &str) -> Result<Vec<RoleAssignments>> {
        let mut roles = Vec::new();
        for role_id in self.assignments.roles_by_user(user_id).await? {
            roles.push(self.assignments.load(&role_id).await?);
        }
        Ok(roles)
    }

    async fn merge_access(&self, roles: &[RoleAssignments]) -> Result<ResolvedAccess> {
        let mut cache = TemplateCache::default();
        let mut resolved = ResolvedAccess::new();
        for role in roles {
            for name in &role.modules {
                if let Some(module) = cache.get(&self.templates, name).await? {
                    resolved.insert(name.clone(), overlay_access(module, role));
                }
            }
        }
        Ok(resolved)
    }

    async fn merge_actions(&self, roles: &[RoleAssignments]) -> Result<ResolvedActions> {
        let mut cache = TemplateCache::default();
        let mut resolved = ResolvedActions::new();
        for role in roles {
            for name in &role.modules {
                if let Some(module) = cache.get(&self.templates, name).await? {
                    resolved.insert(name.clone(), overlay_actions(module, role));
                }
            }
        }
        Ok(resolved)
    }

    /// Compute a user's access tree without touching the cache
    pub async fn compute_access(&self, user_id: &str) -> Result<ResolvedAccess> {
        let roles = self.load_roles(user_id).await?;
        self.merge_access(&roles).await
    }

    /// Compute a user's action lists without touching the cache
    pub async fn compute_actions(&self, user_id: &str) -> Result<ResolvedActions> {
        let roles = self.load_roles(user_id).await?;
        self.merge_actions(&roles).await
    }

    /// Recompute and overwrite the cached access tree of a user
    pub async fn resolve_access(&self, user_id: &str) -> Result<ResolvedAccess> {
        let resolved = self.compute_access(user_id).await?;
        let raw = serde_json::to_string(&resolved)?;
        self.store.set(&keys::access_list(user_id), &raw, None).await?;

        info!(user_id = %user_id, modules = resolved.len(), "Access list refreshed");
        Ok(resolved)
    }

    /// Queue writes replacing a user's cached action lists with `resolved`
    ///
    /// Entries for modules the user no longer reaches are deleted.
    async fn stage_actions(
        &self,
        batch: &mut WriteBatch,
        user_id: &str,
        resolved: &ResolvedActions,
    ) -> Result<()> {
        let existing = self
            .store
            .keys_with_prefix(&keys::module_actions_prefix(user_id))
            .await?;
        let fresh: BTreeSet<String> = resolved
            .keys()
            .map(|module| keys::module_actions(user_id, module))
            .collect();
        for key in existing.into_iter().filter(|key| !fresh.contains(key)) {
            batch.delete(key);
        }
        for (module, actions) in resolved {
            batch.set(
                keys::module_actions(user_id, module),
                serde_json::to_string(actions)?,
                None,
            );
        }
        Ok(())
    }

    fn stage_permission_set(batch: &mut WriteBatch, user_id: &str, granted: &BTreeSet<String>) {
        let key = keys::permission_set(user_id);
        batch.delete(&key).set_add(&key, granted.iter().cloned());
    }

    /// Recompute and overwrite the cached per-module action lists of a user
    pub async fn resolve_actions(&self, user_id: &str) -> Result<ResolvedActions> {
        let resolved = self.compute_actions(user_id).await?;
        let mut batch = WriteBatch::new();
        self.stage_actions(&mut batch, user_id, &resolved).await?;
        self.store.execute(batch).await?;

        info!(user_id = %user_id, modules = resolved.len(), "Action lists refreshed");
        Ok(resolved)
    }

    /// Rebuild the flattened permission set of a user from all their roles
    pub async fn refresh_permission_set(&self, user_id: &str) -> Result<BTreeSet<String>> {
        let roles = self.load_roles(user_id).await?;
        let granted: BTreeSet<String> = roles.iter().flat_map(granted_permissions).collect();

        let mut batch = WriteBatch::new();
        Self::stage_permission_set(&mut batch, user_id, &granted);
        self.store.execute(batch).await?;

        debug!(user_id = %user_id, permissions = granted.len(), "Permission set refreshed");
        Ok(granted)
    }

    /// Rebuild the action lists and the permission set of a user together
    ///
    /// Both views come from one read of the user's roles and land in a single
    /// batch, so they never disagree.
    pub async fn resolve_actions_and_permissions(
        &self,
        user_id: &str,
    ) -> Result<(ResolvedActions, BTreeSet<String>)> {
        let roles = self.load_roles(user_id).await?;
        let resolved = self.merge_actions(&roles).await?;
        let granted: BTreeSet<String> = roles.iter().flat_map(granted_permissions).collect();

        let mut batch = WriteBatch::new();
        self.stage_actions(&mut batch, user_id, &resolved).await?;
        Self::stage_permission_set(&mut batch, user_id, &granted);
        self.store.execute(batch).await?;

        info!(
            user_id = %user_id,
            modules = resolved.len(),
            permissions = granted.len(),
            "Action lists and permission set refreshed"
        );
        Ok((resolved, granted))
    }

    /// Drop the cached access tree of a user
    pub async fn clear_access(&self, user_id: &str) -> Result<()> {
        self.store.delete(&keys::access_list(user_id)).await?;
        info!(user_id = %user_id, "Access list removed");
        Ok(())
    }

    /// Drop the cached action lists and permission set of a user
    pub async fn clear_actions(&self, user_id: &str) -> Result<()> {
        let mut batch = WriteBatch::new();
        for key in self
            .store
            .keys_with_prefix(&keys::module_actions_prefix(user_id))
            .await?
        {
            batch.delete(key);
        }
        batch.delete(keys::permission_set(user_id));
        self.store.execute(batch).await?;

        info!(user_id = %user_id, "Action lists removed");
        Ok(())
    }

    /// Resolve a single role against the template, uncached
    pub async fn role_access_list(&self, role_id: &str) -> Result<ResolvedAccess> {
        self.assignments.require_role(role_id).await?;
        let role = self.assignments.load(role_id).await?;
        self.merge_access(std::slice::from_ref(&role)).await
    }

    /// Cached access tree of a user
    pub async fn access_list(&self, user_id: &str) -> Result<ResolvedAccess> {
        let raw = self
            .store
            .get(&keys::access_list(user_id))
            .await?
            .ok_or_else(|| {
                AccessError::not_found(format!("user '{}' has no access list", user_id))
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Cached actions of a user in one module
    pub async fn action_list_by_module(&self, module: &str, user_id: &str) -> Result<ModuleActions> {
        let raw = self
            .store
            .get(&keys::module_actions(user_id, module))
            .await?
            .ok_or_else(|| {
                AccessError::not_found(format!(
                    "user '{}' has no actions in module '{}'",
                    user_id, module
                ))
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Check a permission against the flattened set only
    ///
    /// A user without a cached set has no permissions.
    pub async fn check_permission(&self, user_id: &str, permission: &str) -> Result<bool> {
        self.store
            .set_is_member(&keys::permission_set(user_id), permission)
            .await
    }
}
