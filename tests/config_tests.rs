//! Configuration loading tests. Serialized because they mutate process
//! environment variables.

use serial_test::serial;
use tenant_console_backend::audit::AuditMode;
use tenant_console_backend::Config;

fn clear_env() {
    for key in [
        "DATABASE_URL",
        "JWT_SECRET",
        "BIND_ADDRESS",
        "USE_STORED_PROCEDURES",
        "AUDIT_MODE",
        "STORAGE_BACKEND",
        "DEMO_MODE",
        "CORS_ORIGINS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_from_env_minimal() {
    clear_env();
    std::env::set_var("DATABASE_URL", "postgresql://localhost/console");
    std::env::set_var(
        "JWT_SECRET",
        "test_secret_key_minimum_32_characters_long",
    );

    let config = Config::from_env().unwrap();
    assert_eq!(config.bind_address, "0.0.0.0:8080");
    assert!(!config.use_stored_procedures);
    assert_eq!(config.audit_mode, AuditMode::SameTransaction);
    assert_eq!(config.jwt_access_expiry_hours, 1);
    assert_eq!(config.jwt_refresh_expiry_days, 7);
    assert_eq!(config.storage_backend, "filesystem");
    assert!(config.cors_origins.is_empty());
}

#[test]
#[serial]
fn test_from_env_full_flags() {
    clear_env();
    std::env::set_var("DATABASE_URL", "postgresql://localhost/console");
    std::env::set_var(
        "JWT_SECRET",
        "test_secret_key_minimum_32_characters_long",
    );
    std::env::set_var("USE_STORED_PROCEDURES", "true");
    std::env::set_var("AUDIT_MODE", "secondary");
    std::env::set_var("DEMO_MODE", "1");
    std::env::set_var("CORS_ORIGINS", "http://a.example.com, http://b.example.com");

    let config = Config::from_env().unwrap();
    assert!(config.use_stored_procedures);
    assert_eq!(config.audit_mode, AuditMode::Secondary);
    assert!(config.demo_mode);
    assert_eq!(
        config.cors_origins,
        vec!["http://a.example.com", "http://b.example.com"]
    );
}

#[test]
#[serial]
fn test_missing_jwt_secret_is_rejected() {
    clear_env();
    std::env::set_var("DATABASE_URL", "postgresql://localhost/console");
    assert!(Config::from_env().is_err());
}

#[test]
#[serial]
fn test_short_jwt_secret_is_rejected() {
    clear_env();
    std::env::set_var("DATABASE_URL", "postgresql://localhost/console");
    std::env::set_var("JWT_SECRET", "too-short");
    assert!(Config::from_env().is_err());
}

#[test]
#[serial]
fn test_bogus_audit_mode_is_rejected() {
    clear_env();
    std::env::set_var("DATABASE_URL", "postgresql://localhost/console");
    std::env::set_var(
        "JWT_SECRET",
        "test_secret_key_minimum_32_characters_long",
    );
    std::env::set_var("AUDIT_MODE", "sometimes");
    assert!(Config::from_env().is_err());
}
