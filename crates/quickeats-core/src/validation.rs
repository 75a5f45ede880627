//! # Config Validation
//!
//! Checks a `PosConfig` before it is saved or connected, reporting every
//! problem at once so the admin form can show them together.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. provider set and not `none`        "POS provider not selected"     │
//! │  2. credentials object present         "Credentials are required"      │
//! │  3. per-provider required fields (only when rule 2 passed)              │
//! │       toast:  API Key, API Secret, Location ID                          │
//! │       square: Access Token, Location ID                                 │
//! │  4. syncInterval > 0 when autoSyncMenu is on                            │
//! │                                                                         │
//! │  Rules never short-circuit. Order of messages follows the rule order.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::config::PosConfig;
use crate::error::ConfigError;
use crate::provider::PosProvider;
use crate::sync::ConfigValidation;

/// Returns every rule violation of `config`, in rule order.
pub fn config_errors(config: &PosConfig) -> Vec<ConfigError> {
    let mut errors = Vec::new();

    if !config.provider.is_selectable() {
        errors.push(ConfigError::ProviderNotSelected);
    }

    match &config.credentials {
        None => errors.push(ConfigError::CredentialsRequired),
        Some(creds) => {
            let checks: Vec<(&'static str, bool)> = match config.provider {
                PosProvider::Toast => vec![
                    ("API Key", creds.api_key().is_some()),
                    ("API Secret", creds.api_secret().is_some()),
                    ("Location ID", creds.location_id().is_some()),
                ],
                PosProvider::Square => vec![
                    ("Access Token", creds.access_token().is_some()),
                    ("Location ID", creds.location_id().is_some()),
                ],
                _ => Vec::new(),
            };

            errors.extend(
                checks
                    .into_iter()
                    .filter(|(_, ok)| !ok)
                    .map(|(label, _)| ConfigError::MissingCredential {
                        provider: config.provider,
                        label,
                    }),
            );
        }
    }

    if config.settings.auto_sync_menu && config.settings.sync_interval == 0 {
        errors.push(ConfigError::InvalidSetting {
            field: "syncInterval".to_string(),
            reason: "must be greater than 0 when auto-sync is enabled".to_string(),
        });
    }

    errors
}

/// Validates `config` into the `{ valid, errors }` shape the admin UI reads.
pub fn validate_config(config: &PosConfig) -> ConfigValidation {
    let errors: Vec<String> = config_errors(config)
        .iter()
        .map(ToString::to_string)
        .collect();

    ConfigValidation {
        valid: errors.is_empty(),
        errors,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSet;

    fn with_creds(provider: PosProvider, creds: CredentialSet) -> PosConfig {
        let mut config = PosConfig::new("r1", provider);
        config.credentials = Some(creds);
        config
    }

    #[test]
    fn test_square_reports_both_missing_fields() {
        let report = validate_config(&with_creds(PosProvider::Square, CredentialSet::default()));
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec![
                "Square Access Token is required".to_string(),
                "Square Location ID is required".to_string(),
            ]
        );
    }

    #[test]
    fn test_toast_reports_all_three() {
        let report = validate_config(&with_creds(PosProvider::Toast, CredentialSet::default()));
        assert_eq!(
            report.errors,
            vec![
                "Toast API Key is required",
                "Toast API Secret is required",
                "Toast Location ID is required",
            ]
        );
    }

    #[test]
    fn test_valid_toast_config() {
        let creds = CredentialSet {
            api_key: Some("key".into()),
            api_secret: Some("secret".into()),
            location_id: Some("loc".into()),
            ..Default::default()
        };
        let report = validate_config(&with_creds(PosProvider::Toast, creds));
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_none_provider_without_credentials() {
        let report = validate_config(&PosConfig::new("r1", PosProvider::None));
        assert_eq!(
            report.errors,
            vec!["POS provider not selected", "Credentials are required"]
        );
    }

    #[test]
    fn test_unrecognized_provider_is_not_selected() {
        let report = validate_config(&with_creds(PosProvider::Unrecognized, CredentialSet::default()));
        assert_eq!(report.errors, vec!["POS provider not selected"]);
    }

    #[test]
    fn test_announced_provider_needs_only_credentials_object() {
        let report = validate_config(&with_creds(PosProvider::Clover, CredentialSet::default()));
        assert!(report.valid);
    }

    #[test]
    fn test_zero_interval_with_auto_sync() {
        let mut config = with_creds(
            PosProvider::Square,
            CredentialSet {
                access_token: Some("t".into()),
                location_id: Some("L".into()),
                ..Default::default()
            },
        );
        config.settings.sync_interval = 0;
        let errors = config_errors(&config);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ConfigError::InvalidSetting { .. }));

        config.settings.auto_sync_menu = false;
        assert!(config_errors(&config).is_empty());
    }
}
