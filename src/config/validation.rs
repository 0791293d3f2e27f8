#![allow(clippy::collapsible_if)]

use std::net::SocketAddr;

use crate::config::models::{RouteRule, ServerConfig};

/// Validation result type alias
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validation error types
#[derive(Debug, thiserror::Error, Clone)]
pub enum ValidationError {
    #[error("Invalid listen address '{address}': {reason}")]
    InvalidListenAddress { address: String, reason: String },

    #[error("Invalid base path '{base_path}': must start with '/'")]
    InvalidBasePath { base_path: String },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid rule under '{pattern}': {message}")]
    InvalidRule { pattern: String, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },
}

/// Server configuration validator.
///
/// Runs once at startup; the engine assumes any table it receives already
/// passed these checks.
pub struct ServerConfigValidator;

impl ServerConfigValidator {
    /// Validate the entire server configuration
    pub fn validate(config: &ServerConfig) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_listen_address(&config.listen_addr) {
            errors.push(e);
        }

        if !config.base_path.starts_with('/') {
            errors.push(ValidationError::InvalidBasePath {
                base_path: config.base_path.clone(),
            });
        }

        for (pattern, rule) in &config.rules {
            if let Err(e) = Self::validate_pattern(pattern) {
                errors.push(e);
            }
            if let Err(mut rule_errors) = Self::validate_rule(pattern, rule) {
                errors.append(&mut rule_errors);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ValidationFailed {
                message: Self::format_multiple_errors(errors),
            })
        }
    }

    fn validate_listen_address(addr: &str) -> ValidationResult<()> {
        addr.parse::<SocketAddr>()
            .map(|_| ())
            .map_err(|e| ValidationError::InvalidListenAddress {
                address: addr.to_string(),
                reason: e.to_string(),
            })
    }

    fn validate_pattern(pattern: &str) -> ValidationResult<()> {
        if !pattern.starts_with('/') {
            return Err(ValidationError::InvalidPattern {
                pattern: pattern.to_string(),
                message: "must start with '/'".to_string(),
            });
        }

        // The wildcard marker is only meaningful as a trailing `/**`.
        if let Some(pos) = pattern.find("**") {
            if pos + 2 != pattern.len() || !pattern.ends_with("/**") {
                return Err(ValidationError::InvalidPattern {
                    pattern: pattern.to_string(),
                    message: "wildcard marker is only supported as a trailing '/**'".to_string(),
                });
            }
        }

        Ok(())
    }

    fn validate_rule(pattern: &str, rule: &RouteRule) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Some(redirect) = &rule.redirect {
            if redirect.to.is_empty() {
                errors.push(ValidationError::InvalidRule {
                    pattern: pattern.to_string(),
                    message: "redirect target must not be empty".to_string(),
                });
            }
            if let Some(code) = redirect.status_code {
                if !(300..400).contains(&code) {
                    errors.push(ValidationError::InvalidRule {
                        pattern: pattern.to_string(),
                        message: format!("redirect status code {code} is not a 3xx code"),
                    });
                }
            }
        }

        if let Some(proxy) = &rule.proxy {
            if proxy.to.is_empty() {
                errors.push(ValidationError::InvalidRule {
                    pattern: pattern.to_string(),
                    message: "proxy target must not be empty".to_string(),
                });
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn format_multiple_errors(errors: Vec<ValidationError>) -> String {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
