//! Role administration
//!
//! Role lifecycle plus module, submodule and section assignment. Every
//! mutation validates its inputs, writes the assignment store and then
//! announces the change on the event bus.

use super::assignments::AssignmentStore;
use super::resolver::AccessResolver;
use super::template::TemplateStore;
use super::types::{Module, ResolvedAccess, Role, SubModule};
use super::{announce, validate_list};
use crate::events::{EventBus, EventClass};
use crate::storage::{KeyValueStore, SharedStore, WriteBatch, keys};
use crate::utils::error::{AccessError, Result};
use std::collections::BTreeMap;
use tracing::info;

/// Assignment changes to modules and submodules reshape both cached views
const STRUCTURE_CHANGE: &[EventClass] = &[EventClass::Access, EventClass::Action];
const SECTION_CHANGE: &[EventClass] = &[EventClass::Access];

#[derive(Debug, Clone)]
pub struct AccessService {
    store: SharedStore,
    templates: TemplateStore,
    assignments: AssignmentStore,
    resolver: AccessResolver,
    bus: EventBus,
}

impl AccessService {
    pub fn new(
        store: SharedStore,
        templates: TemplateStore,
        assignments: AssignmentStore,
        resolver: AccessResolver,
        bus: EventBus,
    ) -> Self {
        Self {
            store,
            templates,
            assignments,
            resolver,
            bus,
        }
    }

    /// Create a role and return its generated id (`r1`, `r2`, ...)
    pub async fn add_role(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccessError::validation("role name cannot be empty"));
        }

        let seq = self.store.increment(keys::ROLE_SEQUENCE, 1).await?;
        let role_id = format!("r{}", seq);
        self.store.hash_set(keys::ROLES, &role_id, name).await?;

        info!(role_id = %role_id, "Created role {}", name);
        Ok(role_id)
    }

    pub async fn edit_role(&self, role_id: &str, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccessError::validation("role name cannot be empty"));
        }
        self.assignments.require_role(role_id).await?;
        self.store.hash_set(keys::ROLES, role_id, name).await?;

        info!(role_id = %role_id, "Renamed role to {}", name);
        Ok(())
    }

    pub async fn role_exists(&self, role_id: &str) -> Result<bool> {
        self.assignments.role_exists(role_id).await
    }

    pub async fn role(&self, role_id: &str) -> Result<Role> {
        self.assignments.role(role_id).await
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>> {
        self.assignments.list_roles().await
    }

    /// Delete a role with all of its assignments and user links
    ///
    /// Holders are captured before the reverse index is dropped and each of
    /// them gets its own event, since listeners can no longer find them
    /// through the role afterwards.
    pub async fn delete_role(&self, role_id: &str) -> Result<()> {
        self.assignments.require_role(role_id).await?;

        let holders = self.assignments.users_by_role(role_id).await?;
        let role_keys = self
            .store
            .keys_with_prefix(&keys::role_namespace(role_id))
            .await?;

        let mut batch = WriteBatch::new();
        for user_id in &holders {
            batch.set_remove(keys::user_roles(user_id), [role_id]);
        }
        batch
            .delete(keys::role_users(role_id))
            .hash_delete(keys::ROLES, role_id);
        for key in role_keys {
            batch.delete(key);
        }
        self.store.execute(batch).await?;
        info!(role_id = %role_id, holders = holders.len(), "Deleted role");

        if holders.is_empty() {
            announce(&self.bus, role_id, None, &[EventClass::Access]);
        }
        for user_id in &holders {
            announce(&self.bus, role_id, Some(user_id.as_str()), &EventClass::ALL);
        }
        Ok(())
    }

    pub async fn assign_modules(&self, role_id: &str, modules: &[String]) -> Result<()> {
        validate_list("module", modules)?;
        self.assignments.require_role(role_id).await?;
        for module in modules {
            self.templates.require_module(module).await?;
        }

        self.store
            .execute(single(|b| {
                b.set_add(keys::role_modules(role_id), modules.iter().cloned());
            }))
            .await?;

        info!(role_id = %role_id, ?modules, "Assigned modules");
        announce(&self.bus, role_id, None, STRUCTURE_CHANGE);
        Ok(())
    }

    pub async fn unassign_modules(&self, role_id: &str, modules: &[String]) -> Result<()> {
        validate_list("module", modules)?;
        self.assignments.require_role(role_id).await?;

        self.store
            .execute(single(|b| {
                b.set_remove(keys::role_modules(role_id), modules.iter().cloned());
            }))
            .await?;

        info!(role_id = %role_id, ?modules, "Unassigned modules");
        announce(&self.bus, role_id, None, STRUCTURE_CHANGE);
        Ok(())
    }

    pub async fn assign_submodules(
        &self,
        role_id: &str,
        module: &str,
        submodules: &[String],
    ) -> Result<()> {
        validate_list("submodule", submodules)?;
        self.assignments.require_role(role_id).await?;
        let template = self.templates.require_module(module).await?;
        for sub in submodules {
            require_submodule(&template, sub)?;
        }

        self.store
            .execute(single(|b| {
                b.set_add(
                    keys::role_submodules(role_id, module),
                    submodules.iter().cloned(),
                );
            }))
            .await?;

        info!(role_id = %role_id, module, ?submodules, "Assigned submodules");
        announce(&self.bus, role_id, None, STRUCTURE_CHANGE);
        Ok(())
    }

    pub async fn unassign_submodules(
        &self,
        role_id: &str,
        module: &str,
        submodules: &[String],
    ) -> Result<()> {
        keys::validate_name("module", module)?;
        validate_list("submodule", submodules)?;
        self.assignments.require_role(role_id).await?;

        self.store
            .execute(single(|b| {
                b.set_remove(
                    keys::role_submodules(role_id, module),
                    submodules.iter().cloned(),
                );
            }))
            .await?;

        info!(role_id = %role_id, module, ?submodules, "Unassigned submodules");
        announce(&self.bus, role_id, None, STRUCTURE_CHANGE);
        Ok(())
    }

    pub async fn assign_sections(
        &self,
        role_id: &str,
        module: &str,
        submodule: &str,
        sections: &[String],
    ) -> Result<()> {
        validate_list("section", sections)?;
        self.assignments.require_role(role_id).await?;
        let template = self.templates.require_module(module).await?;
        let sub = require_submodule(&template, submodule)?;
        if let Some(missing) = sections.iter().find(|s| !sub.has_section(s)) {
            return Err(AccessError::not_found(format!(
                "section '{}' not found in {}/{}",
                missing, module, submodule
            )));
        }

        self.store
            .execute(single(|b| {
                b.set_add(
                    keys::role_sections(role_id, module, submodule),
                    sections.iter().cloned(),
                );
            }))
            .await?;

        info!(role_id = %role_id, module, submodule, ?sections, "Assigned sections");
        announce(&self.bus, role_id, None, SECTION_CHANGE);
        Ok(())
    }

    pub async fn unassign_sections(
        &self,
        role_id: &str,
        module: &str,
        submodule: &str,
        sections: &[String],
    ) -> Result<()> {
        keys::validate_name("module", module)?;
        keys::validate_name("submodule", submodule)?;
        validate_list("section", sections)?;
        self.assignments.require_role(role_id).await?;

        self.store
            .execute(single(|b| {
                b.set_remove(
                    keys::role_sections(role_id, module, submodule),
                    sections.iter().cloned(),
                );
            }))
            .await?;

        info!(role_id = %role_id, module, submodule, ?sections, "Unassigned sections");
        announce(&self.bus, role_id, None, SECTION_CHANGE);
        Ok(())
    }

    /// Names of every template module
    pub async fn module_names(&self) -> Result<Vec<String>> {
        self.templates.module_names().await
    }

    /// Full template tree of one module
    pub async fn module_structure(&self, name: &str) -> Result<Module> {
        self.templates.require_module(name).await
    }

    pub async fn modules_by_role(&self, role_id: &str) -> Result<Vec<String>> {
        self.assignments.require_role(role_id).await?;
        self.assignments.modules_by_role(role_id).await
    }

    pub async fn submodules_by_role(&self, role_id: &str) -> Result<BTreeMap<String, Vec<String>>> {
        self.assignments.require_role(role_id).await?;
        self.assignments.submodules_by_role(role_id).await
    }

    pub async fn sections_by_role(
        &self,
        role_id: &str,
    ) -> Result<BTreeMap<String, BTreeMap<String, Vec<String>>>> {
        self.assignments.require_role(role_id).await?;
        self.assignments.sections_by_role(role_id).await
    }

    /// Access tree granted by a single role
    pub async fn role_access_list(&self, role_id: &str) -> Result<ResolvedAccess> {
        self.resolver.role_access_list(role_id).await
    }
}

/// Build a batch holding the writes of `fill`
pub(super) fn single(fill: impl FnOnce(&mut WriteBatch)) -> WriteBatch {
    let mut batch = WriteBatch::new();
    fill(&mut batch);
    batch
}

pub(super) fn require_submodule<'a>(
    module: &'a Module,
    name: &str,
) -> Result<&'a SubModule> {
    module.submodule(name).ok_or_else(|| {
        AccessError::not_found(format!(
            "submodule '{}' not found in module '{}'",
            name, module.name
        ))
    })
}
