//! Redis backed engine tests

#[cfg(test)]
#[cfg(feature = "redis")]
mod tests {
    use crate::common::eventually;
    use crate::common::fixtures::{UserFactory, engine_on, names};
    use crate::{assert_ok, skip_without_env};
    use roleguard::config::RedisConfig;
    use roleguard::storage::keys;
    use roleguard::storage::redis::RedisPool;
    use roleguard::{KeyValueStore, SharedStore};
    use std::sync::Arc;

    async fn redis_store() -> SharedStore {
        let config = RedisConfig {
            url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            connection_timeout: 5,
        };
        let store = RedisPool::new(&config).await.expect("connect to redis");
        for key in store.keys_with_prefix("").await.expect("list keys") {
            store.delete(&key).await.expect("flush key");
        }
        Arc::new(store)
    }

    #[tokio::test]
    #[ignore]
    async fn test_permission_cache_on_redis() {
        skip_without_env!("REDIS_URL");
        let engine = &engine_on(redis_store().await).await;
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
        assert_ok!(authz.add_user(&UserFactory::create("u1")).await);
        assert_ok!(authz.assign_role("u1", &role).await);

        assert!(
            eventually(move || async move {
                engine
                    .authorization()
                    .check_permission("u1", "delete:account:[]")
                    .await
                    .unwrap_or(false)
            })
            .await
        );

        assert_ok!(roles.delete_role(&role).await);
        assert!(
            eventually(move || async move {
                !engine
                    .store()
                    .exists(&keys::permission_set("u1"))
                    .await
                    .unwrap_or(true)
            })
            .await
        );
        engine.shutdown();
    }

    #[tokio::test]
    #[ignore]
    async fn test_refresh_is_single_use_on_redis() {
        skip_without_env!("REDIS_URL");
        let engine = engine_on(redis_store().await).await;
        let sessions = engine.sessions();

        let pair = assert_ok!(sessions.create_token("u1").await);
        assert_ok!(sessions.refresh_token(&pair.refresh_token, None).await);
        assert!(sessions.refresh_token(&pair.refresh_token, None).await.is_err());
        engine.shutdown();
    }
}
