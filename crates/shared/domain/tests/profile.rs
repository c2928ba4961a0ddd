use corral_domain::profile::{
    DatabaseConfig, Engine, LogRotation, Profile, SecurityProvider, SizeUnit,
};
use serde_json::json;

#[test]
fn profile_defaults_are_sane() {
    let profile: Profile = serde_json::from_value(json!({})).expect("empty profile");
    assert_eq!(profile.app.name, "CorralApp");
    assert_eq!(profile.app.port, 8000);
    assert!(!profile.app.debug);
    assert!(profile.app.openapi.enabled);
    assert_eq!(profile.app.openapi.path, "/openapi.json");

    assert!(profile.database.upgrade_at_start);
    assert_eq!(profile.database.engine, Engine::Postgres);
    assert!(!profile.database.is_configured());

    assert_eq!(profile.security.provider, SecurityProvider::Jwt);

    assert_eq!(profile.log.folder, "logs");
    assert_eq!(profile.log.rotation.keep, 10);
    assert!(!profile.log.remote.enabled);
}

#[test]
fn profile_deserializes_nested_sections() {
    let raw = json!({
        "app": {
            "name": "Billing",
            "port": 9100,
            "debug": true,
            "openapi": { "origins": ["https://billing.example.com"] }
        },
        "database": {
            "upgrade-at-start": false,
            "engine": "mysql",
            "host": "db.internal",
            "port": 3306,
            "database": "billing",
            "user": "svc",
            "password": "hunter2"
        },
        "security": { "provider": "cognito", "pool-id": "eu-1_abc" },
        "log": {
            "level": "warning",
            "rotation": { "size": 512, "unit": "kb", "keep": 3 },
            "remote": { "enabled": true, "group": "billing", "retention": 14 }
        }
    });

    let profile: Profile = serde_json::from_value(raw).expect("profile deserialize");
    assert_eq!(profile.app.name, "Billing");
    assert!(!profile.database.upgrade_at_start);
    assert_eq!(profile.database.engine, Engine::Mysql);
    assert!(profile.database.is_configured());
    assert_eq!(profile.security.provider, SecurityProvider::Cognito);
    assert_eq!(profile.security.pool_id.as_deref(), Some("eu-1_abc"));
    assert_eq!(profile.log.rotation.keep, 3);
    assert!(profile.log.remote.enabled);
    assert_eq!(profile.log.remote.retention_days, 14);
}

#[test]
fn rotation_threshold_converts_units() {
    let kb = LogRotation { size: 512, unit: SizeUnit::Kb, keep: 5 };
    assert_eq!(kb.threshold_bytes(), 512 * 1024);

    let mb = LogRotation { size: 2, unit: SizeUnit::Mb, keep: 5 };
    assert_eq!(mb.threshold_bytes(), 2 * 1024 * 1024);
}

#[test]
fn unknown_engine_is_rejected() {
    let err = serde_json::from_value::<DatabaseConfig>(json!({ "engine": "oracle" }));
    assert!(err.is_err(), "unsupported engine must not deserialize");
}

#[test]
fn postgresql_alias_is_accepted() {
    let cfg: DatabaseConfig =
        serde_json::from_value(json!({ "engine": "postgresql" })).expect("alias");
    assert_eq!(cfg.engine, Engine::Postgres);
    assert_eq!(cfg.engine.scheme(), "postgres");
}
