//! # Roleguard
//!
//! Role based access control engine. Roles grant modules, submodules,
//! sections and actions of a permission template; every user's effective
//! permissions are cached in a key-value store and rebuilt in the background
//! whenever an assignment changes. Sessions are JWT pairs whose identifiers
//! live in the same store, so they can be revoked before they expire.
//!
//! ## Features
//!
//! - **Cached permission trees**: per-user access tree, per-module action lists
//!   and a flattened permission set for constant time checks
//! - **Invalidation events**: an in-process bus with one listener per cached view
//! - **Revocable sessions**: access/refresh pairs with single use refresh
//! - **Pluggable storage**: Redis or an in-memory store
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use roleguard::{AccessEngine, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/roleguard.yaml").await?;
//!     let engine = AccessEngine::new(config).await?;
//!     let _listeners = engine.start_listeners();
//!
//!     let role = engine.roles().add_role("Tellers").await?;
//!     engine.roles().assign_modules(&role, &["accounts".to_string()]).await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod auth;
pub mod config;
pub mod events;
pub mod rbac;
pub mod storage;
pub mod utils;

// Re-export main types
pub use auth::{Claims, JwtHandler, LoggedUser, SessionManager, TokenKind, TokenPair};
pub use config::Config;
pub use events::{EventBus, EventClass, InvalidationListener, RoleEvent, Subscription};
pub use rbac::{
    AccessResolver, AccessService, AssignmentStore, AuthorizationService, Module, ModuleAccess,
    ModuleActions, ResolvedAccess, ResolvedActions, Role, SeedReport, SubModule, TemplateStore,
    User, UserDirectory,
};
pub use storage::{KeyValueStore, MemoryStore, SharedStore};
pub use utils::error::{AccessError, Result};

use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Every component of the engine wired to one store and one event bus
#[derive(Debug, Clone)]
pub struct AccessEngine {
    config: Config,
    store: SharedStore,
    bus: EventBus,
    templates: TemplateStore,
    assignments: AssignmentStore,
    resolver: AccessResolver,
    roles: AccessService,
    authorization: AuthorizationService,
    sessions: SessionManager,
}

impl AccessEngine {
    /// Connect to the configured store and build the engine
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let store = storage::create_store(config.storage()).await?;
        Self::with_store(config, store)
    }

    /// Build the engine on top of an existing store
    pub fn with_store(config: Config, store: SharedStore) -> Result<Self> {
        info!(backend = store.backend_name(), "Creating access engine");

        let jwt = Arc::new(JwtHandler::new(config.auth())?);
        let bus = EventBus::new(config.events().queue_capacity);
        let templates = TemplateStore::new(store.clone());
        let assignments = AssignmentStore::new(store.clone());
        let users = UserDirectory::new(store.clone());
        let resolver = AccessResolver::new(store.clone(), templates.clone(), assignments.clone());

        let roles = AccessService::new(
            store.clone(),
            templates.clone(),
            assignments.clone(),
            resolver.clone(),
            bus.clone(),
        );
        let authorization = AuthorizationService::new(
            store.clone(),
            templates.clone(),
            assignments.clone(),
            resolver.clone(),
            users.clone(),
            bus.clone(),
        );
        let sessions = SessionManager::new(store.clone(), jwt, users);

        Ok(Self {
            config,
            store,
            bus,
            templates,
            assignments,
            resolver,
            roles,
            authorization,
            sessions,
        })
    }

    /// Subscribe one listener per event class and run each on its own task
    ///
    /// The tasks end after [`AccessEngine::shutdown`] once their queues drain.
    pub fn start_listeners(&self) -> Vec<JoinHandle<()>> {
        EventClass::ALL
            .iter()
            .map(|&class| {
                let subscription = self.bus.subscribe(class);
                let listener =
                    InvalidationListener::new(class, self.resolver.clone(), self.assignments.clone());
                tokio::spawn(listener.run(subscription))
            })
            .collect()
    }

    /// Seed the permission template from `dir`, or the configured directory
    pub async fn seed_template(&self, dir: Option<&Path>, force: bool) -> Result<SeedReport> {
        let dir = match dir {
            Some(dir) => dir,
            None => self.config.seed().template_dir.as_deref().ok_or_else(|| {
                AccessError::config("no template directory configured for seeding")
            })?,
        };
        self.templates
            .seed_from_dir(dir, force || self.config.seed().force)
            .await
    }

    /// Stop accepting events; listeners exit after their queues drain
    pub fn shutdown(&self) {
        info!("Shutting down access engine");
        self.bus.close();
    }

    pub async fn health_check(&self) -> Result<()> {
        self.store.health_check().await
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    pub fn resolver(&self) -> &AccessResolver {
        &self.resolver
    }

    /// Role administration and module/submodule/section assignment
    pub fn roles(&self) -> &AccessService {
        &self.roles
    }

    /// Users, actions, role holders and cached permission reads
    pub fn authorization(&self) -> &AuthorizationService {
        &self.authorization
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Description of the crate
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
