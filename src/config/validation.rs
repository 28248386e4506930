//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check value ranges (timeouts > 0, thresholds ≥ 1)
//! - Detect duplicate group policies
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::AppConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("clash.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),

    #[error("clash.control_timeout_ms must be greater than 0")]
    ZeroControlTimeout,

    #[error("switcher.interval_ms must be greater than 0")]
    ZeroInterval,

    #[error("switcher.max_concurrent_groups must be greater than 0")]
    ZeroConcurrency,

    #[error("duplicate policy for group '{0}'")]
    DuplicateGroup(String),

    #[error("group '{0}': preferred endpoint must not be empty")]
    EmptyPreferred(String),

    #[error("group '{0}': test_url is not a valid URL")]
    InvalidTestUrl(String),

    #[error("group '{0}': probe_timeout_ms must be greater than 0")]
    ZeroProbeTimeout(String),

    #[error("group '{0}': max_delay_ms must be greater than 0")]
    ZeroMaxDelay(String),

    #[error("group '{0}': max_failures must be at least 1")]
    ZeroMaxFailures(String),

    #[error("monitor.interval_ms must be greater than 0")]
    ZeroMonitorInterval,

    #[error("monitor.retention_days must be at least 1")]
    ZeroRetention,

    #[error("monitor target '{0}': probe_timeout_ms must be greater than 0")]
    ZeroMonitorProbeTimeout(String),
}

/// Validate a parsed configuration, reporting every violation.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if url::Url::parse(&config.clash.base_url).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(
            config.clash.base_url.clone(),
        ));
    }
    if config.clash.control_timeout_ms == 0 {
        errors.push(ValidationError::ZeroControlTimeout);
    }
    if config.switcher.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.switcher.max_concurrent_groups == 0 {
        errors.push(ValidationError::ZeroConcurrency);
    }

    let mut seen = HashSet::new();
    for policy in &config.switcher.groups {
        if !seen.insert(policy.group.as_str()) {
            errors.push(ValidationError::DuplicateGroup(policy.group.clone()));
        }
        if policy.preferred.trim().is_empty() {
            errors.push(ValidationError::EmptyPreferred(policy.group.clone()));
        }
        if url::Url::parse(&policy.test_url).is_err() {
            errors.push(ValidationError::InvalidTestUrl(policy.group.clone()));
        }
        if policy.probe_timeout_ms == 0 {
            errors.push(ValidationError::ZeroProbeTimeout(policy.group.clone()));
        }
        if policy.max_delay_ms == 0 {
            errors.push(ValidationError::ZeroMaxDelay(policy.group.clone()));
        }
        if policy.max_failures == 0 {
            errors.push(ValidationError::ZeroMaxFailures(policy.group.clone()));
        }
    }

    if config.monitor.enabled {
        if config.monitor.interval_ms == 0 {
            errors.push(ValidationError::ZeroMonitorInterval);
        }
        if config.monitor.retention_days == 0 {
            errors.push(ValidationError::ZeroRetention);
        }
        for target in &config.monitor.targets {
            if target.probe_timeout_ms == 0 {
                errors.push(ValidationError::ZeroMonitorProbeTimeout(
                    target.group.clone(),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
