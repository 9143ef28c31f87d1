//! RBAC data model
//!
//! The permission template is authored as `Module`/`SubModule`/`Action`.
//! Resolution overlays role assignments onto it and produces the
//! `Resolved*` structures that are cached per user.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A top level module of the permission template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    #[serde(default)]
    pub submodules: Vec<SubModule>,
}

/// A submodule: boolean gated sections plus named actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubModule {
    pub name: String,
    #[serde(default)]
    pub sections: Vec<String>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

/// A named operation, e.g. `delete:account:[]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub title: String,
}

impl Module {
    pub fn submodule(&self, name: &str) -> Option<&SubModule> {
        self.submodules.iter().find(|s| s.name == name)
    }
}

impl SubModule {
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s == name)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.actions.iter().any(|a| a.name == name)
    }
}

/// A role as listed by the role registry
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

/// A known identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Resolved access tree: module name to module access
pub type ResolvedAccess = BTreeMap<String, ModuleAccess>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccess {
    pub access: bool,
    pub submodules: Vec<SubModuleAccess>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubModuleAccess {
    pub name: String,
    pub access: bool,
    pub sections: BTreeMap<String, bool>,
}

/// Resolved actions: module name to per-submodule action grants
pub type ResolvedActions = BTreeMap<String, ModuleActions>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleActions {
    pub submodules: Vec<SubModuleActions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubModuleActions {
    pub name: String,
    pub actions: BTreeMap<String, ActionGrant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGrant {
    pub title: String,
    pub allowed: bool,
}

/// Raw assignments of a single role, as stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAssignments {
    /// Assigned module names
    pub modules: Vec<String>,
    /// Module to assigned submodules
    pub submodules: BTreeMap<String, Vec<String>>,
    /// Module to submodule to assigned sections
    pub sections: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Module to submodule to assigned actions
    pub actions: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl RoleAssignments {
    pub fn has_submodule(&self, module: &str, submodule: &str) -> bool {
        self.submodules
            .get(module)
            .is_some_and(|subs| subs.iter().any(|s| s == submodule))
    }

    pub fn sections_of(&self, module: &str, submodule: &str) -> &[String] {
        self.sections
            .get(module)
            .and_then(|subs| subs.get(submodule))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn actions_of(&self, module: &str, submodule: &str) -> &[String] {
        self.actions
            .get(module)
            .and_then(|subs| subs.get(submodule))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
