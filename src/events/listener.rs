//! Invalidation listener
//!
//! Processes the events of one class strictly in order. A failed event is
//! logged and skipped; the cache stays stale until the next mutation that
//! touches the same users.

use super::bus::Subscription;
use super::types::{EventClass, RoleEvent};
use crate::rbac::{AccessResolver, AssignmentStore};
use crate::utils::error::Result;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone)]
pub struct InvalidationListener {
    class: EventClass,
    resolver: AccessResolver,
    assignments: AssignmentStore,
}

impl InvalidationListener {
    pub fn new(class: EventClass, resolver: AccessResolver, assignments: AssignmentStore) -> Self {
        Self {
            class,
            resolver,
            assignments,
        }
    }

    pub fn class(&self) -> EventClass {
        self.class
    }

    /// Receive loop; returns once the subscription is closed
    pub async fn run(self, mut subscription: Subscription) {
        info!("{} listener started", self.class);

        let mut errors_open = true;
        loop {
            tokio::select! {
                event = subscription.events.recv() => match event {
                    Some(event) => {
                        if let Err(e) = self.process(&event).await {
                            error!(
                                role_id = %event.role_id,
                                user_id = ?event.user_id,
                                "{} invalidation failed: {}",
                                self.class,
                                e
                            );
                        }
                    }
                    None => break,
                },
                reported = subscription.errors.recv(), if errors_open => match reported {
                    Some(e) => warn!("{} listener received error: {}", self.class, e),
                    None => errors_open = false,
                },
            }
        }

        info!("{} listener stopped", self.class);
    }

    /// Recompute or tear down the caches of every user affected by `event`
    ///
    /// Affected users are the current holders of the role plus the event's
    /// user, if any. Returns the number of users whose caches were touched.
    pub async fn process(&self, event: &RoleEvent) -> Result<usize> {
        if event.class != self.class {
            warn!(
                "{} listener ignoring {} event for role {}",
                self.class, event.class, event.role_id
            );
            return Ok(0);
        }

        let mut affected = self.assignments.users_by_role(&event.role_id).await?;
        if let Some(user_id) = &event.user_id {
            if !affected.contains(user_id) {
                affected.push(user_id.clone());
            }
        }
        debug!(
            role_id = %event.role_id,
            users = affected.len(),
            "Processing {} event",
            self.class
        );

        for user_id in &affected {
            let remaining = self.assignments.roles_by_user(user_id).await?;
            if remaining.is_empty() {
                self.teardown(user_id).await?;
            } else {
                self.recompute(user_id).await?;
            }
        }
        Ok(affected.len())
    }

    async fn recompute(&self, user_id: &str) -> Result<()> {
        match self.class {
            EventClass::Access => {
                self.resolver.resolve_access(user_id).await?;
            }
            EventClass::Action => {
                self.resolver.resolve_actions_and_permissions(user_id).await?;
            }
        }
        Ok(())
    }

    async fn teardown(&self, user_id: &str) -> Result<()> {
        match self.class {
            EventClass::Access => self.resolver.clear_access(user_id).await,
            EventClass::Action => self.resolver.clear_actions(user_id).await,
        }
    }
}
