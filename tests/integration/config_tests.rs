//! Configuration loading integration tests

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{TemplateFactory, test_config};
    use crate::{assert_err, assert_ok};
    use roleguard::config::StoreBackend;
    use roleguard::{AccessEngine, AccessError, Config};
    use std::io::Write;

    #[tokio::test]
    async fn test_engine_from_yaml_file_seeds_template() {
        let templates = tempfile::tempdir().unwrap();
        TemplateFactory::write_to(templates.path(), &TemplateFactory::bank());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "auth:\n  jwt_secret: \"{}\"\nstorage:\n  backend: memory\nseed:\n  template_dir: \"{}\"",
            crate::common::fixtures::TEST_SECRET,
            templates.path().display()
        )
        .unwrap();

        let config = assert_ok!(Config::from_file(file.path()).await);
        assert_eq!(config.storage().backend, StoreBackend::Memory);

        let engine = assert_ok!(AccessEngine::new(config).await);
        let report = assert_ok!(engine.seed_template(None, false).await);
        assert_eq!(report.modules, vec!["accounts", "reports"]);

        let again = assert_ok!(engine.seed_template(None, false).await);
        assert!(again.skipped);
        assert_eq!(
            assert_ok!(engine.roles().module_names().await),
            vec!["accounts", "reports"]
        );
    }

    #[tokio::test]
    async fn test_short_secret_is_rejected() {
        let mut config = test_config();
        config.service.auth.jwt_secret = "short".to_string();

        let err = assert_err!(AccessEngine::new(config).await);
        assert!(matches!(err, AccessError::Config(_)));
    }
}
