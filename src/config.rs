//! TOML-based audit configuration.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::audit::report::{DEFAULT_SITE_NAME, SiteInfo};
use crate::demo::DEMO_HOURS;
use crate::io::import::Delimiter;

/// Top-level configuration parsed from TOML.
///
/// Every section is optional. Load from TOML with
/// [`AuditConfig::from_toml_file`] or start from [`AuditConfig::default`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Site metadata printed in the report.
    #[serde(default)]
    pub site: SiteConfig,
    /// CSV input options.
    #[serde(default)]
    pub input: InputConfig,
    /// Synthetic dataset options.
    #[serde(default)]
    pub demo: DemoConfig,
}

/// Site metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site display name.
    pub name: String,
    /// Floor area (m²). Absent or 0 disables EUI.
    pub area_m2: Option<f64>,
    /// Free-text reporting period.
    pub period: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_SITE_NAME.to_string(),
            area_m2: None,
            period: None,
        }
    }
}

/// CSV input options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Field separator: `"auto"`, `","` or `";"`.
    pub delimiter: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: "auto".to_string(),
        }
    }
}

/// Synthetic dataset options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Random seed for the jitter.
    pub seed: u64,
    /// First day of the dataset as a quoted ISO date; today when absent.
    pub start_date: Option<NaiveDate>,
    /// Number of hourly readings (must be > 0).
    pub hours: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_date: None,
            hours: DEMO_HOURS,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"site.area_m2"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl AuditConfig {
    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Some(area) = self.site.area_m2 {
            if !area.is_finite() || area < 0.0 {
                errors.push(ConfigError {
                    field: "site.area_m2".into(),
                    message: "must be a finite number >= 0".into(),
                });
            }
        }

        if Delimiter::from_name(&self.input.delimiter).is_none() {
            errors.push(ConfigError {
                field: "input.delimiter".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    Delimiter::NAMES
                        .iter()
                        .map(|n| format!("\"{n}\""))
                        .collect::<Vec<_>>()
                        .join(", "),
                    self.input.delimiter
                ),
            });
        }

        if self.demo.hours == 0 {
            errors.push(ConfigError {
                field: "demo.hours".into(),
                message: "must be > 0".into(),
            });
        }

        errors
    }

    /// Resolved field separator; `Auto` if the configured name is unknown.
    pub fn delimiter(&self) -> Delimiter {
        Delimiter::from_name(&self.input.delimiter).unwrap_or(Delimiter::Auto)
    }

    /// Site metadata for the report builder.
    pub fn site_info(&self) -> SiteInfo {
        SiteInfo {
            name: self.site.name.clone(),
            area_m2: self.site.area_m2,
            period: self.site.period.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let errors = AuditConfig::default().validate();
        assert!(errors.is_empty(), "default should be valid: {errors:?}");
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[site]
name = "Oficina Centro"
area_m2 = 120.0
period = "marzo 2024"

[input]
delimiter = ";"

[demo]
seed = 7
start_date = "2024-03-01"
hours = 72
"#;
        let cfg = AuditConfig::from_toml_str(toml);
        assert!(cfg.is_ok(), "valid TOML should parse: {:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.site.name.as_str()), Some("Oficina Centro"));
        assert_eq!(cfg.as_ref().and_then(|c| c.site.area_m2), Some(120.0));
        assert_eq!(cfg.as_ref().map(|c| c.delimiter()), Some(Delimiter::Semicolon));
        assert_eq!(
            cfg.as_ref().and_then(|c| c.demo.start_date),
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(cfg.as_ref().map(|c| c.demo.hours), Some(72));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let toml = r#"
[demo]
seed = 99
"#;
        let cfg = AuditConfig::from_toml_str(toml).ok();
        assert_eq!(cfg.as_ref().map(|c| c.demo.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.demo.hours), Some(DEMO_HOURS));
        assert_eq!(cfg.as_ref().map(|c| c.site.name.as_str()), Some(DEFAULT_SITE_NAME));
        assert_eq!(cfg.as_ref().map(|c| c.input.delimiter.as_str()), Some("auto"));
    }

    #[test]
    fn unknown_field_rejected() {
        let toml = r#"
[site]
name = "x"
floors = 3
"#;
        assert!(AuditConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn bad_start_date_rejected() {
        let toml = r#"
[demo]
start_date = "01/03/2024"
"#;
        assert!(AuditConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn validation_catches_negative_area() {
        let mut cfg = AuditConfig::default();
        cfg.site.area_m2 = Some(-5.0);
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "site.area_m2"));
    }

    #[test]
    fn zero_area_is_valid_but_unusable() {
        let mut cfg = AuditConfig::default();
        cfg.site.area_m2 = Some(0.0);
        assert!(cfg.validate().is_empty());
        assert_eq!(cfg.site_info().usable_area(), None);
    }

    #[test]
    fn validation_catches_bad_delimiter() {
        let mut cfg = AuditConfig::default();
        cfg.input.delimiter = "|".to_string();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "input.delimiter"));
    }

    #[test]
    fn validation_catches_zero_hours() {
        let mut cfg = AuditConfig::default();
        cfg.demo.hours = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "demo.hours"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AuditConfig::from_toml_file(Path::new("does/not/exist.toml"));
        let e = err.err().map(|e| e.message).unwrap_or_default();
        assert!(e.contains("does/not/exist.toml"));
    }
}
