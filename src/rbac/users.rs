//! User directory
//!
//! Users live in a `user:<id>` hash with an `email -> id` index in `users`.

use super::types::User;
use crate::storage::{KeyValueStore, SharedStore, WriteBatch, keys};
use crate::utils::error::{AccessError, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// Read and register users
#[derive(Debug, Clone)]
pub struct UserDirectory {
    store: SharedStore,
}

fn validate_user(user: &User) -> Result<()> {
    keys::validate_name("user id", &user.id)?;
    if user.name.trim().is_empty() {
        return Err(AccessError::validation("user name cannot be empty"));
    }
    let email = user.email.trim();
    if email.is_empty() || !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AccessError::validation(format!(
            "invalid email address '{}'",
            user.email
        )));
    }
    Ok(())
}

fn user_from_fields(fields: HashMap<String, String>) -> Option<User> {
    Some(User {
        id: fields.get("id")?.clone(),
        email: fields.get("email")?.clone(),
        name: fields.get("name").cloned().unwrap_or_default(),
        is_admin: fields.get("is_admin").is_some_and(|v| v == "true"),
    })
}

impl UserDirectory {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Register a user; ids and emails must both be unused
    pub async fn add_user(&self, user: &User) -> Result<()> {
        validate_user(user)?;

        if self.is_valid_user(&user.id).await? {
            return Err(AccessError::validation(format!(
                "user '{}' already exists",
                user.id
            )));
        }
        if self.store.hash_get(keys::USERS, &user.email).await?.is_some() {
            return Err(AccessError::validation(format!(
                "email '{}' is already registered",
                user.email
            )));
        }

        let key = keys::user(&user.id);
        let mut batch = WriteBatch::new();
        batch
            .hash_set(&key, "id", &user.id)
            .hash_set(&key, "email", &user.email)
            .hash_set(&key, "name", &user.name)
            .hash_set(&key, "is_admin", user.is_admin.to_string())
            .hash_set(keys::USERS, &user.email, &user.id);
        self.store.execute(batch).await?;

        info!(user_id = %user.id, "Registered user");
        Ok(())
    }

    pub async fn user_by_id(&self, id: &str) -> Result<User> {
        let fields = self.store.hash_get_all(&keys::user(id)).await?;
        user_from_fields(fields)
            .ok_or_else(|| AccessError::not_found(format!("user '{}' not found", id)))
    }

    pub async fn user_by_email(&self, email: &str) -> Result<User> {
        let id = self
            .store
            .hash_get(keys::USERS, email)
            .await?
            .ok_or_else(|| AccessError::not_found(format!("no user with email '{}'", email)))?;
        self.user_by_id(&id).await
    }

    /// All users, ordered by id
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let index = self.store.hash_get_all(keys::USERS).await?;
        let mut ids: Vec<String> = index.into_values().collect();
        ids.sort();

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            match self.user_by_id(&id).await {
                Ok(user) => users.push(user),
                Err(AccessError::NotFound(_)) => debug!("Email index points at missing user {}", id),
                Err(e) => return Err(e),
            }
        }
        Ok(users)
    }

    /// Users currently holding `role_id`, ordered by id
    pub async fn users_by_role(&self, role_id: &str) -> Result<Vec<User>> {
        let mut ids = self.store.set_members(&keys::role_users(role_id)).await?;
        ids.sort();

        let mut users = Vec::with_capacity(ids.len());
        for id in ids {
            users.push(self.user_by_id(&id).await?);
        }
        Ok(users)
    }

    pub async fn is_valid_user(&self, id: &str) -> Result<bool> {
        self.store.exists(&keys::user(id)).await
    }
}
