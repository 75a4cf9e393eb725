use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_to_postgres() {
    let cfg = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/mangaka")])).unwrap();
    assert_eq!(
        cfg.store,
        StoreBackend::Postgres {
            database_url: "postgres://localhost/mangaka".into(),
            max_connections: DEFAULT_DB_MAX_CONNECTIONS
        }
    );
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.page_op_timeout, Duration::from_millis(DEFAULT_PAGE_OP_TIMEOUT_MS));
    assert!(cfg.renumber_fallback);
}

#[test]
fn postgres_requires_database_url() {
    let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
    assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
}

#[test]
fn memory_store_needs_no_database() {
    let cfg = AppConfig::from_lookup(lookup(&[
        ("PAGE_STORE", "memory"),
        ("PORT", "8080"),
        ("PAGE_OP_TIMEOUT_MS", "250"),
        ("PAGE_RENUMBER_FALLBACK", "false"),
    ]))
    .unwrap();
    assert_eq!(cfg.store, StoreBackend::Memory);
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.page_op_timeout, Duration::from_millis(250));
    assert!(!cfg.renumber_fallback);
}

#[test]
fn unknown_store_is_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("PAGE_STORE", "sqlite")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PAGE_STORE", .. }));
}

#[test]
fn unparsable_numbers_are_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("PAGE_STORE", "memory"), ("PORT", "eighty")])).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { var: "PORT", value: "eighty".into() });
}

#[test]
fn zero_timeout_is_rejected() {
    let err = AppConfig::from_lookup(lookup(&[("PAGE_STORE", "memory"), ("PAGE_OP_TIMEOUT_MS", "0")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PAGE_OP_TIMEOUT_MS", .. }));
}

#[test]
fn config_errors_carry_stable_codes() {
    use crate::error::ErrorCode;

    let missing = AppConfig::from_lookup(lookup(&[])).unwrap_err();
    assert_eq!(missing.error_code(), "E_CONFIG_MISSING");

    let invalid = AppConfig::from_lookup(lookup(&[("PAGE_STORE", "memory"), ("PORT", "eighty")])).unwrap_err();
    assert_eq!(invalid.error_code(), "E_CONFIG_INVALID");
}
