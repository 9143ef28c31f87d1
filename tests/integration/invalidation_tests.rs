//! Cache invalidation integration tests
//!
//! Mutations go through the services; the caches are only ever written by
//! the background listeners.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{UserFactory, names};
    use crate::common::{eventually, memory_engine};
    use crate::{assert_err, assert_ok};
    use roleguard::{AccessEngine, AccessError};

    async fn has_permission(engine: &AccessEngine, user_id: &str, permission: &str) -> bool {
        engine
            .authorization()
            .check_permission(user_id, permission)
            .await
            .unwrap_or(false)
    }

    async fn section_granted(
        engine: &AccessEngine,
        user_id: &str,
        submodule: &str,
        section: &str,
    ) -> bool {
        match engine.authorization().access_list(user_id).await {
            Ok(tree) => tree.get("accounts").is_some_and(|module| {
                module
                    .submodules
                    .iter()
                    .any(|s| s.name == submodule && s.sections.get(section) == Some(&true))
            }),
            Err(_) => false,
        }
    }

    /// Role on accounts/ledger with the delete action, held by `user_id`
    async fn teller(engine: &AccessEngine, user_id: &str) -> String {
        let roles = engine.roles();
        let authz = engine.authorization();
        let role = assert_ok!(roles.add_role("Tellers").await);
        assert_ok!(roles.assign_modules(&role, &names(&["accounts"])).await);
        assert_ok!(roles.assign_submodules(&role, "accounts", &names(&["ledger"])).await);
        assert_ok!(
            authz
                .assign_actions(&role, "accounts", "ledger", &names(&["delete:account:[]"]))
                .await
        );
        assert_ok!(authz.add_user(&UserFactory::create(user_id)).await);
        assert_ok!(authz.assign_role(user_id, &role).await);
        role
    }

    #[tokio::test]
    async fn test_assign_role_builds_caches() {
        let engine = &memory_engine().await;
        teller(engine, "u1").await;

        assert!(eventually(move || has_permission(engine, "u1", "delete:account:[]")).await);
        assert!(!has_permission(engine, "u1", "view:account:[]").await);

        assert!(eventually(move || async move { engine.authorization().access_list("u1").await.is_ok() }).await);
        let actions = assert_ok!(
            engine
                .authorization()
                .action_list_by_module("accounts", "u1")
                .await
        );
        assert!(actions.submodules[0].actions["delete:account:[]"].allowed);
    }

    #[tokio::test]
    async fn test_section_change_reaches_holders() {
        let engine = &memory_engine().await;
        let role = teller(engine, "u1").await;
        assert!(eventually(move || async move { engine.authorization().access_list("u1").await.is_ok() }).await);
        assert!(!section_granted(engine, "u1", "ledger", "history").await);

        assert_ok!(
            engine
                .roles()
                .assign_sections(&role, "accounts", "ledger", &names(&["history"]))
                .await
        );
        assert!(eventually(move || section_granted(engine, "u1", "ledger", "history")).await);

        assert_ok!(
            engine
                .roles()
                .unassign_sections(&role, "accounts", "ledger", &names(&["history"]))
                .await
        );
        assert!(
            eventually(move || async move { !section_granted(engine, "u1", "ledger", "history").await })
                .await
        );
    }

    #[tokio::test]
    async fn test_action_revocation() {
        let engine = &memory_engine().await;
        let role = teller(engine, "u1").await;
        assert!(eventually(move || has_permission(engine, "u1", "delete:account:[]")).await);

        assert_ok!(
            engine
                .authorization()
                .unassign_actions(&role, "accounts", "ledger", &names(&["delete:account:[]"]))
                .await
        );
        assert!(
            eventually(move || async move { !has_permission(engine, "u1", "delete:account:[]").await })
                .await
        );
    }

    #[tokio::test]
    async fn test_submodule_removal_drops_actions() {
        let engine = &memory_engine().await;
        let role = teller(engine, "u1").await;
        assert!(eventually(move || has_permission(engine, "u1", "delete:account:[]")).await);

        assert_ok!(
            engine
                .roles()
                .unassign_submodules(&role, "accounts", &names(&["ledger"]))
                .await
        );
        assert!(
            eventually(move || async move { !has_permission(engine, "u1", "delete:account:[]").await })
                .await
        );
    }

    #[tokio::test]
    async fn test_last_role_removed_tears_down_caches() {
        let engine = &memory_engine().await;
        let role = teller(engine, "u1").await;
        assert!(eventually(move || has_permission(engine, "u1", "delete:account:[]")).await);

        assert_ok!(engine.authorization().unassign_role("u1", &role).await);

        assert!(
            eventually(move || async move {
                matches!(
                    engine.authorization().access_list("u1").await,
                    Err(AccessError::NotFound(_))
                )
            })
            .await
        );
        assert!(
            eventually(move || async move { !has_permission(engine, "u1", "delete:account:[]").await })
                .await
        );
        let err = assert_err!(
            engine
                .authorization()
                .action_list_by_module("accounts", "u1")
                .await
        );
        assert!(matches!(err, AccessError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remaining_role_still_applies() {
        let engine = &memory_engine().await;
        let first = teller(engine, "u1").await;

        let second = assert_ok!(engine.roles().add_role("Reporting").await);
        assert_ok!(engine.roles().assign_modules(&second, &names(&["reports"])).await);
        assert_ok!(engine.authorization().assign_role("u1", &second).await);

        assert!(
            eventually(move || async move {
                engine
                    .authorization()
                    .access_list("u1")
                    .await
                    .is_ok_and(|tree| tree.contains_key("reports"))
            })
            .await
        );

        assert_ok!(engine.authorization().unassign_role("u1", &first).await);
        assert!(
            eventually(move || async move {
                engine
                    .authorization()
                    .access_list("u1")
                    .await
                    .is_ok_and(|tree| tree.contains_key("reports") && !tree.contains_key("accounts"))
            })
            .await
        );
        assert!(
            eventually(move || async move { !has_permission(engine, "u1", "delete:account:[]").await })
                .await
        );
    }

    #[tokio::test]
    async fn test_delete_role_clears_every_holder() {
        let engine = &memory_engine().await;
        let role = teller(engine, "u1").await;
        assert_ok!(engine.authorization().add_user(&UserFactory::create("u2")).await);
        assert_ok!(engine.authorization().assign_role("u2", &role).await);
        for user in ["u1", "u2"] {
            assert!(eventually(move || has_permission(engine, user, "delete:account:[]")).await);
        }

        assert_ok!(engine.roles().delete_role(&role).await);

        for user in ["u1", "u2"] {
            assert!(
                eventually(move || async move { !has_permission(engine, user, "delete:account:[]").await })
                    .await
            );
            assert!(
                eventually(move || async move { engine.authorization().access_list(user).await.is_err() })
                    .await
            );
        }
        assert!(!assert_ok!(engine.roles().role_exists(&role).await));
    }

    #[tokio::test]
    async fn test_shutdown_stops_invalidation() {
        let engine = &memory_engine().await;
        engine.shutdown();
        assert!(
            eventually(move || async move {
                !engine.bus().has_subscriber(roleguard::EventClass::Access)
            })
            .await
        );

        teller(engine, "u1").await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!has_permission(engine, "u1", "delete:account:[]").await);
    }
}
