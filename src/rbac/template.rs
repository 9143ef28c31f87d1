//! Permission template store
//!
//! One JSON document per module under `config:access:<module>`. The template
//! is written by seeding and only read afterwards.

use super::types::Module;
use crate::storage::{KeyValueStore, SharedStore, WriteBatch, keys};
use crate::utils::error::{AccessError, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Outcome of a seeding run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Seeding was skipped because the template already existed
    pub skipped: bool,
    /// Modules written, in load order
    pub modules: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TemplateStore {
    store: SharedStore,
}

/// Check names and uniqueness inside one module definition
pub fn validate_module(module: &Module) -> Result<()> {
    keys::validate_name("module", &module.name)?;

    let mut seen = HashSet::new();
    for sub in &module.submodules {
        keys::validate_name("submodule", &sub.name)?;
        if !seen.insert(sub.name.as_str()) {
            return Err(AccessError::validation(format!(
                "duplicate submodule '{}' in module '{}'",
                sub.name, module.name
            )));
        }
        for section in &sub.sections {
            keys::validate_name("section", section)?;
        }
        if let Some(action) = sub.actions.iter().find(|a| a.name.trim().is_empty()) {
            return Err(AccessError::validation(format!(
                "empty action name in {}/{} (title '{}')",
                module.name, sub.name, action.title
            )));
        }
    }
    Ok(())
}

impl TemplateStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Look a module up by name
    pub async fn module(&self, name: &str) -> Result<Option<Module>> {
        match self.store.get(&keys::template(name)).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Look a module up by name, failing with `NotFound` when absent
    pub async fn require_module(&self, name: &str) -> Result<Module> {
        self.module(name)
            .await?
            .ok_or_else(|| AccessError::not_found(format!("module '{}' not found", name)))
    }

    /// Names of every module in the template, sorted
    pub async fn module_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self
            .store
            .keys_with_prefix(keys::TEMPLATE_PREFIX)
            .await?
            .into_iter()
            .filter_map(|key| key.strip_prefix(keys::TEMPLATE_PREFIX).map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Store or replace one module definition
    pub async fn add_module(&self, module: &Module) -> Result<()> {
        validate_module(module)?;
        let raw = serde_json::to_string(module)?;
        self.store.set(&keys::template(&module.name), &raw, None).await?;
        debug!("Stored template for module {}", module.name);
        Ok(())
    }

    pub async fn is_seeded(&self) -> Result<bool> {
        Ok(self.store.get(keys::TEMPLATE_SEEDED).await?.as_deref() == Some("true"))
    }

    /// Remove every template key, including the seeded flag
    pub async fn clear(&self) -> Result<usize> {
        let stale = self.store.keys_with_prefix(keys::CONFIG_PREFIX).await?;
        let count = stale.len();

        let mut batch = WriteBatch::new();
        for key in stale {
            batch.delete(key);
        }
        self.store.execute(batch).await?;
        Ok(count)
    }

    /// Seed the template from every `*.json` file in `dir`
    ///
    /// Each file holds one module. Does nothing when the template is already
    /// seeded unless `force` is set, in which case the old template is
    /// cleared first.
    pub async fn seed_from_dir(&self, dir: &Path, force: bool) -> Result<SeedReport> {
        if !force && self.is_seeded().await? {
            info!("Permission template already seeded, skipping");
            return Ok(SeedReport {
                skipped: true,
                modules: Vec::new(),
            });
        }

        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            } else {
                debug!("Ignoring non-JSON template file {:?}", path);
            }
        }
        files.sort();

        let mut modules = Vec::with_capacity(files.len());
        for path in &files {
            let raw = tokio::fs::read_to_string(path).await?;
            let module: Module = serde_json::from_str(&raw).map_err(|e| {
                AccessError::validation(format!("invalid template file {:?}: {}", path, e))
            })?;
            validate_module(&module)?;
            modules.push(module);
        }

        if modules.is_empty() {
            warn!("No template files found in {:?}", dir);
        }
        if force {
            let removed = self.clear().await?;
            info!("Cleared {} template keys before reseeding", removed);
        }

        let mut batch = WriteBatch::new();
        for module in &modules {
            batch.set(keys::template(&module.name), serde_json::to_string(module)?, None);
        }
        batch.set(keys::TEMPLATE_SEEDED, "true", None);
        self.store.execute(batch).await?;

        let names: Vec<String> = modules.into_iter().map(|m| m.name).collect();
        info!("Seeded permission template with {} modules", names.len());
        Ok(SeedReport {
            skipped: false,
            modules: names,
        })
    }
}
