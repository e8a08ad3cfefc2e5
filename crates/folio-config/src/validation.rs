// SPDX-FileCopyrightText: 2026 Folio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as known language codes, non-empty paths, and positive page sizes.

use folio_core::Language;

use crate::diagnostic::ConfigError;
use crate::model::FolioConfig;

/// Upper bound on `blog.page_size`.
const MAX_PAGE_SIZE: u32 = 100;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &FolioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config
        .site
        .default_language
        .trim()
        .parse::<Language>()
        .is_err()
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "site.default_language `{}` is not a supported language (expected en or ru)",
                config.site.default_language
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.blog.page_size == 0 || config.blog.page_size > MAX_PAGE_SIZE {
        errors.push(ConfigError::Validation {
            message: format!(
                "blog.page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                config.blog.page_size
            ),
        });
    }

    if config.blog.request_timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "blog.request_timeout_secs must be at least 1".to_string(),
        });
    }

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
