//! Configuration validation.

use regex::RegexBuilder;
use url::Url;

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Turn the first error into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> Result<ValidationResult, ConfigError> {
        let mut result = ValidationResult::default();

        Self::validate_locator(config, &mut result);
        Self::validate_roles(config, &mut result);
        Self::validate_engine(config, &mut result);
        Self::validate_bridge(config, &mut result);

        Ok(result)
    }

    fn validate_locator(config: &Config, result: &mut ValidationResult) {
        if config.locator.strategies.is_empty() {
            result.add_error(ValidationError::new(
                "locator.strategies",
                "At least one locator strategy is required",
            ));
        }

        for (i, strategy) in config.locator.strategies.iter().enumerate() {
            if strategy.trim().is_empty() {
                result.add_error(ValidationError::new(
                    format!("locator.strategies[{}]", i),
                    "Strategy selector cannot be empty",
                ));
            }
        }
    }

    fn validate_roles(config: &Config, result: &mut ValidationResult) {
        let patterns = [
            ("roles.strategy_pattern", &config.roles.strategy_pattern),
            ("roles.bundle_pattern", &config.roles.bundle_pattern),
        ];
        for (path, pattern) in patterns {
            if let Err(e) = RegexBuilder::new(pattern).case_insensitive(true).build() {
                result.add_error(ValidationError::new(
                    path,
                    format!("Pattern does not compile: {}", e),
                ));
            }
        }
    }

    fn validate_engine(config: &Config, result: &mut ValidationResult) {
        let engine = &config.engine;

        if engine.retry_delays_ms.is_empty() {
            result.add_error(ValidationError::new(
                "engine.retry_delays_ms",
                "At least one retry delay is required",
            ));
        } else if engine.retry_delays_ms.windows(2).any(|w| w[1] <= w[0]) {
            result.add_warning(ValidationWarning::new(
                "engine.retry_delays_ms",
                "Retry delays are not strictly increasing",
            ));
        }

        if engine.observation_window_ms == 0 {
            result.add_error(ValidationError::new(
                "engine.observation_window_ms",
                "observation_window_ms must be greater than 0",
            ));
        } else if engine.observation_window() < engine.retry_budget() {
            result.add_warning(ValidationWarning::new(
                "engine.observation_window_ms",
                "Observation window ends before the detection retries do",
            ));
        }

        if engine.collapsed_class.trim().is_empty() {
            result.add_error(ValidationError::new(
                "engine.collapsed_class",
                "Collapsed class cannot be empty",
            ));
        }
    }

    fn validate_bridge(config: &Config, result: &mut ValidationResult) {
        match Url::parse(&config.bridge.home) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(_) => result.add_error(ValidationError::new(
                "bridge.home",
                "home must be an http:// or https:// URL",
            )),
            Err(e) => result.add_error(ValidationError::new(
                "bridge.home",
                format!("home is not a valid URL: {}", e),
            )),
        }

        if config.bridge.qv_param.trim().is_empty() {
            result.add_error(ValidationError::new(
                "bridge.qv_param",
                "Quick view parameter cannot be empty",
            ));
        }

        if config.bridge.staging_param == config.bridge.qv_param {
            result.add_warning(ValidationWarning::new(
                "bridge.staging_param",
                "Staging parameter equals the quick view parameter",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
