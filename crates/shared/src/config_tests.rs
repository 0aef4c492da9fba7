use super::*;
use rust_decimal_macros::dec;

#[test]
fn test_default_import_settings() {
    let settings = ImportSettings::default();
    assert_eq!(settings.labor_rate, dec!(80));
    assert_eq!(settings.formula_policy, "recompute");
    assert_eq!(settings.layout, "generic");
    assert!(settings.columns.is_empty());
}

#[test]
fn test_default_labor_rate_constant() {
    assert_eq!(DEFAULT_LABOR_RATE, dec!(80));
}

#[test]
fn test_load_without_sources_uses_defaults() {
    temp_env::with_vars_unset(
        [
            "SITEBUDGET__IMPORT__LABOR_RATE",
            "SITEBUDGET__IMPORT__FORMULA_POLICY",
            "SITEBUDGET__IMPORT__LAYOUT",
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.import.labor_rate, dec!(80));
            assert_eq!(config.import.layout, "generic");
        },
    );
}

#[test]
fn test_load_env_overrides() {
    temp_env::with_vars(
        [
            ("SITEBUDGET__IMPORT__LABOR_RATE", Some("90")),
            ("SITEBUDGET__IMPORT__FORMULA_POLICY", Some("prefer_sheet")),
            ("SITEBUDGET__IMPORT__LAYOUT", Some("project_v2")),
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.import.labor_rate, dec!(90));
            assert_eq!(config.import.formula_policy, "prefer_sheet");
            assert_eq!(config.import.layout, "project_v2");
        },
    );
}

#[test]
fn test_load_custom_columns_from_env() {
    temp_env::with_vars(
        [
            ("SITEBUDGET__IMPORT__COLUMNS__LINE_ITEM_NUMBER", Some("0")),
            ("SITEBUDGET__IMPORT__COLUMNS__COST_CODE", Some("4")),
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.import.columns.get("line_item_number"), Some(&0));
            assert_eq!(config.import.columns.get("cost_code"), Some(&4));
        },
    );
}

#[test]
fn test_load_rejects_malformed_labor_rate() {
    temp_env::with_var("SITEBUDGET__IMPORT__LABOR_RATE", Some("eighty"), || {
        let err = AppConfig::load().unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
        assert!(err.to_string().starts_with("Configuration error:"));
    });
}
