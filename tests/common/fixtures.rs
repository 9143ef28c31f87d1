//! Test fixtures and data factories
//!
//! All factories create real objects, not mocks.

use roleguard::config::StoreBackend;
use roleguard::rbac::{Action, SubModule};
use roleguard::{AccessEngine, Config, MemoryStore, Module, SharedStore, User};
use std::path::Path;
use std::sync::Arc;

/// Secret long enough to pass validation
pub const TEST_SECRET: &str = "integration-secret-0123456789abcdefghijklmn";

/// Configuration for an engine on the in-memory store
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.service.auth.jwt_secret = TEST_SECRET.to_string();
    config.service.auth.access_expiration = 300;
    config.service.auth.refresh_expiration = 3600;
    config.service.storage.backend = StoreBackend::Memory;
    config.service.events.queue_capacity = 64;
    config
}

/// Engine on `store` with the bank template loaded and both listeners running
pub async fn engine_on(store: SharedStore) -> AccessEngine {
    let engine = AccessEngine::with_store(test_config(), store).expect("engine");
    for module in TemplateFactory::bank() {
        engine.templates().add_module(&module).await.expect("template");
    }
    // listener tasks are detached; they stop when the engine shuts down
    let _ = engine.start_listeners();
    engine
}

/// Engine on a fresh in-memory store
pub async fn memory_engine() -> AccessEngine {
    engine_on(Arc::new(MemoryStore::new())).await
}

/// Factory for permission templates
pub struct TemplateFactory;

impl TemplateFactory {
    /// `accounts` and `reports` modules of a retail bank
    pub fn bank() -> Vec<Module> {
        vec![
            Module {
                name: "accounts".to_string(),
                submodules: vec![
                    submodule(
                        "ledger",
                        &["balance", "history"],
                        &[
                            ("delete:account:[]", "Delete account"),
                            ("view:account:[]", "View account"),
                        ],
                    ),
                    submodule("cards", &["limits"], &[("block:card:[]", "Block card")]),
                ],
            },
            Module {
                name: "reports".to_string(),
                submodules: vec![submodule(
                    "monthly",
                    &["summary"],
                    &[("export:report:[]", "Export report")],
                )],
            },
        ]
    }

    /// Write each module of `modules` as `<name>.json` into `dir`
    pub fn write_to(dir: &Path, modules: &[Module]) {
        for module in modules {
            let raw = serde_json::to_string_pretty(module).expect("serialize module");
            std::fs::write(dir.join(format!("{}.json", module.name)), raw).expect("write module");
        }
    }
}

fn submodule(name: &str, sections: &[&str], actions: &[(&str, &str)]) -> SubModule {
    SubModule {
        name: name.to_string(),
        sections: sections.iter().map(|s| s.to_string()).collect(),
        actions: actions
            .iter()
            .map(|(name, title)| Action {
                name: name.to_string(),
                title: title.to_string(),
            })
            .collect(),
    }
}

/// Factory for test users
pub struct UserFactory;

impl UserFactory {
    pub fn create(id: &str) -> User {
        User {
            id: id.to_string(),
            email: format!("{}@bank.test", id),
            name: format!("Test User {}", id),
            is_admin: false,
        }
    }

    pub fn admin(id: &str) -> User {
        User {
            is_admin: true,
            ..Self::create(id)
        }
    }
}

/// Owned name lists for assignment calls
pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
