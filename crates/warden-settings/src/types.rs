//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` to match the JSON wire
//! format. Each type implements [`Default`] with production default values.
//! Types marked with `#[serde(default)]` allow partial JSON — missing fields
//! get their default value during deserialization.

use serde::{Deserialize, Serialize};

/// Root settings type for the Warden admission controller.
///
/// Loaded from `~/.warden/settings.json` with defaults applied for missing
/// fields. Environment variables can override specific values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WardenSettings {
    /// Settings schema version.
    pub version: String,
    /// Application name.
    pub name: String,
    /// Capacity ceilings per resource dimension.
    pub limits: LimitSettings,
    /// Admission wait-loop defaults.
    pub admission: AdmissionSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

impl Default for WardenSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            name: "warden".to_string(),
            limits: LimitSettings::default(),
            admission: AdmissionSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl WardenSettings {
    /// Correct invalid invariants in place.
    ///
    /// Called automatically during loading. Out-of-range values are fixed
    /// with a warning rather than rejected, so users get corrected behavior
    /// instead of a confusing error.
    pub fn validate(&mut self) {
        if self.admission.default_poll_interval_ms == 0 {
            tracing::warn!("default_poll_interval_ms must be positive, correcting to 1");
            self.admission.default_poll_interval_ms = 1;
        }
        let adm = &mut self.admission;
        if adm.default_max_wait_ms > 0 && adm.default_poll_interval_ms > adm.default_max_wait_ms {
            tracing::warn!(
                "default_poll_interval_ms ({}) > default_max_wait_ms ({}), correcting",
                adm.default_poll_interval_ms,
                adm.default_max_wait_ms
            );
            adm.default_poll_interval_ms = adm.default_max_wait_ms;
        }
    }
}

/// Capacity ceilings per resource dimension.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimitSettings {
    /// Maximum total active orchestrations/requests.
    pub max_active_requests: u32,
    /// Maximum concurrent model-invocation slots.
    pub max_model_invocations: u32,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            max_active_requests: 10,
            max_model_invocations: 4,
        }
    }
}

/// Admission wait-loop defaults applied when a dispatch request does not
/// specify its own values.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdmissionSettings {
    /// Default maximum wait before a queued request times out.
    pub default_max_wait_ms: u64,
    /// Default interval between capacity re-checks while waiting.
    pub default_poll_interval_ms: u64,
}

impl Default for AdmissionSettings {
    fn default() -> Self {
        Self {
            default_max_wait_ms: 30_000,
            default_poll_interval_ms: 50,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum log level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_production_values() {
        let settings = WardenSettings::default();
        assert_eq!(settings.version, "0.1.0");
        assert_eq!(settings.name, "warden");
        assert_eq!(settings.limits.max_active_requests, 10);
        assert_eq!(settings.limits.max_model_invocations, 4);
        assert_eq!(settings.admission.default_max_wait_ms, 30_000);
        assert_eq!(settings.admission.default_poll_interval_ms, 50);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: WardenSettings =
            serde_json::from_str(r#"{"limits": {"maxActiveRequests": 99}}"#).unwrap();
        assert_eq!(settings.limits.max_active_requests, 99);
        assert_eq!(settings.limits.max_model_invocations, 4);
        assert_eq!(settings.admission.default_poll_interval_ms, 50);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(WardenSettings::default()).unwrap();
        assert!(json["limits"]["maxActiveRequests"].is_number());
        assert!(json["admission"]["defaultMaxWaitMs"].is_number());
    }

    #[test]
    fn validate_corrects_zero_poll_interval() {
        let mut settings = WardenSettings::default();
        settings.admission.default_poll_interval_ms = 0;
        settings.validate();
        assert_eq!(settings.admission.default_poll_interval_ms, 1);
    }

    #[test]
    fn validate_caps_poll_interval_at_max_wait() {
        let mut settings = WardenSettings::default();
        settings.admission.default_max_wait_ms = 100;
        settings.admission.default_poll_interval_ms = 500;
        settings.validate();
        assert_eq!(settings.admission.default_poll_interval_ms, 100);
    }

    #[test]
    fn validate_leaves_valid_settings_alone() {
        let mut settings = WardenSettings::default();
        settings.validate();
        assert_eq!(settings.admission.default_poll_interval_ms, 50);
        assert_eq!(settings.admission.default_max_wait_ms, 30_000);
    }
}
