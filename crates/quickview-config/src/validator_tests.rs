use super::*;

#[test]
fn test_validate_default_config() {
    let config = Config::default();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_empty_strategies() {
    let mut config = Config::default();
    config.locator.strategies.clear();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "locator.strategies"));
}

#[test]
fn test_validate_blank_strategy() {
    let mut config = Config::default();
    config.locator.strategies.push("   ".to_string());

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "locator.strategies[4]"));
}

#[test]
fn test_validate_bad_pattern() {
    let mut config = Config::default();
    config.roles.bundle_pattern = "bundle(".to_string();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "roles.bundle_pattern"));
}

#[test]
fn test_validate_empty_retry_delays() {
    let mut config = Config::default();
    config.engine.retry_delays_ms.clear();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "engine.retry_delays_ms"));
}

#[test]
fn test_validate_non_increasing_delays_warning() {
    let mut config = Config::default();
    config.engine.retry_delays_ms = vec![400, 150];

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "engine.retry_delays_ms"));
}

#[test]
fn test_validate_zero_observation_window() {
    let mut config = Config::default();
    config.engine.observation_window_ms = 0;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(!result.is_valid());
}

#[test]
fn test_validate_short_observation_window_warning() {
    let mut config = Config::default();
    config.engine.observation_window_ms = 500;

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "engine.observation_window_ms"));
}

#[test]
fn test_validate_bad_home() {
    let mut config = Config::default();
    config.bridge.home = "not a url".to_string();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "bridge.home"));

    config.bridge.home = "ftp://shop.example/".to_string();
    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "bridge.home"));
}

#[test]
fn test_validate_empty_qv_param() {
    let mut config = Config::default();
    config.bridge.qv_param = String::new();

    let result = ConfigValidator::validate(&config).unwrap();
    assert!(result.errors.iter().any(|e| e.path == "bridge.qv_param"));
}

#[test]
fn test_into_result() {
    let mut config = Config::default();
    config.bridge.qv_param = String::new();
    let err = ConfigValidator::validate(&config).unwrap().into_result().unwrap_err();
    assert!(err.to_string().contains("bridge.qv_param"));

    let warnings = ConfigValidator::validate(&Config::default())
        .unwrap()
        .into_result()
        .unwrap();
    assert!(warnings.is_empty());
}
