//! Assignment store
//!
//! Read side of the role data: the role registry, per-role assignment sets
//! and the symmetric user/role indexes.

use super::types::{Role, RoleAssignments};
use crate::storage::{KeyValueStore, SharedStore, keys};
use crate::utils::error::{AccessError, Result};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct AssignmentStore {
    store: SharedStore,
}

fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}

impl AssignmentStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub async fn role_exists(&self, role_id: &str) -> Result<bool> {
        Ok(self.store.hash_get(keys::ROLES, role_id).await?.is_some())
    }

    /// Fail with `NotFound` unless the role exists
    pub async fn require_role(&self, role_id: &str) -> Result<()> {
        if self.role_exists(role_id).await? {
            Ok(())
        } else {
            Err(AccessError::not_found(format!("role '{}' not found", role_id)))
        }
    }

    pub async fn role(&self, role_id: &str) -> Result<Role> {
        let name = self
            .store
            .hash_get(keys::ROLES, role_id)
            .await?
            .ok_or_else(|| AccessError::not_found(format!("role '{}' not found", role_id)))?;
        Ok(Role {
            id: role_id.to_string(),
            name,
        })
    }

    /// Every role, ordered by id
    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        let mut roles: Vec<Role> = self
            .store
            .hash_get_all(keys::ROLES)
            .await?
            .into_iter()
            .map(|(id, name)| Role { id, name })
            .collect();
        roles.sort();
        Ok(roles)
    }

    /// Role ids held by a user, in resolution order
    pub async fn roles_by_user(&self, user_id: &str) -> Result<Vec<String>> {
        Ok(sorted(self.store.set_members(&keys::user_roles(user_id)).await?))
    }

    /// User ids holding a role, sorted
    pub async fn users_by_role(&self, role_id: &str) -> Result<Vec<String>> {
        Ok(sorted(self.store.set_members(&keys::role_users(role_id)).await?))
    }

    pub async fn modules_by_role(&self, role_id: &str) -> Result<Vec<String>> {
        Ok(sorted(self.store.set_members(&keys::role_modules(role_id)).await?))
    }

    /// Assigned submodules of every assigned module
    pub async fn submodules_by_role(&self, role_id: &str) -> Result<BTreeMap<String, Vec<String>>> {
        let mut submodules = BTreeMap::new();
        for module in self.modules_by_role(role_id).await? {
            let subs = self
                .store
                .set_members(&keys::role_submodules(role_id, &module))
                .await?;
            submodules.insert(module, sorted(subs));
        }
        Ok(submodules)
    }

    /// Assigned sections of every assigned submodule
    pub async fn sections_by_role(
        &self,
        role_id: &str,
    ) -> Result<BTreeMap<String, BTreeMap<String, Vec<String>>>> {
        Ok(self.load(role_id).await?.sections)
    }

    /// Assigned actions of every assigned submodule
    pub async fn actions_by_role(
        &self,
        role_id: &str,
    ) -> Result<BTreeMap<String, BTreeMap<String, Vec<String>>>> {
        Ok(self.load(role_id).await?.actions)
    }

    /// Read everything assigned to a role
    ///
    /// Only sets reachable through an assigned module and submodule are
    /// loaded; orphaned section or action sets are ignored.
    pub async fn load(&self, role_id: &str) -> Result<RoleAssignments> {
        let mut assignments = RoleAssignments {
            modules: self.modules_by_role(role_id).await?,
            ..Default::default()
        };

        for module in &assignments.modules {
            let subs = sorted(
                self.store
                    .set_members(&keys::role_submodules(role_id, module))
                    .await?,
            );

            let mut sections = BTreeMap::new();
            let mut actions = BTreeMap::new();
            for sub in &subs {
                let sec = self
                    .store
                    .set_members(&keys::role_sections(role_id, module, sub))
                    .await?;
                let act = self
                    .store
                    .set_members(&keys::role_actions(role_id, module, sub))
                    .await?;
                sections.insert(sub.clone(), sorted(sec));
                actions.insert(sub.clone(), sorted(act));
            }

            assignments.submodules.insert(module.clone(), subs);
            assignments.sections.insert(module.clone(), sections);
            assignments.actions.insert(module.clone(), actions);
        }

        Ok(assignments)
    }
}
