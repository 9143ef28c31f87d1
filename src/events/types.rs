//! Event types

use serde::{Deserialize, Serialize};

/// Which cached view an event invalidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventClass {
    /// Access tree (modules, submodules, sections)
    Access,
    /// Action lists and the flattened permission set
    Action,
}

impl EventClass {
    pub const ALL: [EventClass; 2] = [EventClass::Access, EventClass::Action];
}

impl std::fmt::Display for EventClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventClass::Access => write!(f, "access"),
            EventClass::Action => write!(f, "action"),
        }
    }
}

/// A role or assignment mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleEvent {
    pub role_id: String,
    /// Set when the mutation concerned a specific user
    pub user_id: Option<String>,
    pub class: EventClass,
}

impl RoleEvent {
    pub fn new(role_id: impl Into<String>, class: EventClass) -> Self {
        Self {
            role_id: role_id.into(),
            user_id: None,
            class,
        }
    }

    pub fn for_user(role_id: impl Into<String>, user_id: impl Into<String>, class: EventClass) -> Self {
        Self {
            role_id: role_id.into(),
            user_id: Some(user_id.into()),
            class,
        }
    }
}
