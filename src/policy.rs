//! Threshold configuration and checks.
//!
//! The configuration is a YAML file with the same layout the migration
//! tooling around this crate already uses, so an existing `config.yml` can
//! be passed as is. Sections this crate does not know about (server
//! credentials, SMTP, tags) are ignored.
//!
//! ```yaml
//! logging_level: info
//! performance_thresholds:
//!   max_views: 20
//!   max_quick_filter_count: 8
//!   allow_custom_sql: false
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::common::{Error, Result};
use crate::metrics::MetricsRecord;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log filter used when `RUST_LOG` is not set (`error`, `info`, `debug`, ...)
    pub logging_level: Option<String>,
    /// Limits a workbook must stay within
    pub performance_thresholds: Thresholds,
}

impl Config {
    /// Read a configuration file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse a configuration from YAML text. Empty text yields the defaults.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_saphyr::from_str(content).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Upper bounds for each metric. `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub max_views: Option<usize>,
    pub max_dashboards: Option<usize>,
    pub max_datasources: Option<usize>,
    pub max_calc_len: Option<usize>,
    pub max_field_count: Option<usize>,
    pub max_quick_filter_count: Option<usize>,
    /// Whether custom SQL relations are acceptable
    pub allow_custom_sql: bool,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_views: None,
            max_dashboards: None,
            max_datasources: None,
            max_calc_len: None,
            max_field_count: None,
            max_quick_filter_count: None,
            allow_custom_sql: true,
        }
    }
}

impl Thresholds {
    /// Every limit the record exceeds, in field order.
    ///
    /// A value equal to its limit passes.
    pub fn check(&self, record: &MetricsRecord) -> Vec<Violation> {
        let limits = [
            ("views", record.views, self.max_views),
            ("dashboards", record.dashboards, self.max_dashboards),
            ("datasources", record.datasources, self.max_datasources),
            ("max_calc_len", record.max_calc_len, self.max_calc_len),
            ("max_field_count", record.max_field_count, self.max_field_count),
            ("max_quick_filter_count", record.max_quick_filter_count, self.max_quick_filter_count),
        ];

        let mut violations: Vec<Violation> = limits
            .into_iter()
            .filter_map(|(metric, value, limit)| {
                let limit = limit?;
                (value > limit).then_some(Violation::LimitExceeded { metric, value, limit })
            })
            .collect();

        if record.custom_sql && !self.allow_custom_sql {
            violations.push(Violation::CustomSql);
        }

        violations
    }
}

/// A threshold the workbook does not meet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A metric is above its configured maximum
    LimitExceeded {
        metric: &'static str,
        value: usize,
        limit: usize,
    },
    /// Custom SQL is used while disallowed
    CustomSql,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::LimitExceeded { metric, value, limit } => {
                write!(f, "{} is {}, above the limit of {}", metric, value, limit)
            },
            Violation::CustomSql => write!(f, "custom SQL is not allowed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = Config::from_yaml_str(
            "logging_level: debug\n\
             performance_thresholds:\n  max_views: 20\n  max_quick_filter_count: 4\n\
             \x20 allow_custom_sql: false\n",
        )
        .unwrap();

        assert_eq!(config.logging_level.as_deref(), Some("debug"));
        assert_eq!(config.performance_thresholds.max_views, Some(20));
        assert_eq!(config.performance_thresholds.max_quick_filter_count, Some(4));
        assert_eq!(config.performance_thresholds.max_dashboards, None);
        assert!(!config.performance_thresholds.allow_custom_sql);
    }

    #[test]
    fn test_unrelated_sections_are_ignored() {
        let config = Config::from_yaml_str(
            "tableau_server:\n  server: https://tableau.example.com\n  username: admin\n  site: ''\n\
             tags:\n  reject_tag: rejected\n\
             performance_thresholds:\n  max_views: 10\n  max_elapsed_time: 5\n\
             logging_level: error\n",
        )
        .unwrap();

        assert_eq!(config.performance_thresholds.max_views, Some(10));
        assert!(config.performance_thresholds.allow_custom_sql);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    }

    #[test]
    fn test_wrong_type_is_invalid_config() {
        let err =
            Config::from_yaml_str("performance_thresholds:\n  max_views: many\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_path(dir.path().join("config.yml")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_check_reports_exceeded_limits_in_order() {
        let thresholds = Thresholds {
            max_views: Some(10),
            max_dashboards: Some(2),
            max_quick_filter_count: Some(3),
            allow_custom_sql: false,
            ..Default::default()
        };
        let record = MetricsRecord {
            custom_sql: true,
            views: 21,
            dashboards: 2,
            max_quick_filter_count: 6,
            ..Default::default()
        };

        let violations = thresholds.check(&record);
        assert_eq!(
            violations,
            vec![
                Violation::LimitExceeded { metric: "views", value: 21, limit: 10 },
                Violation::LimitExceeded { metric: "max_quick_filter_count", value: 6, limit: 3 },
                Violation::CustomSql,
            ]
        );
        assert_eq!(violations[0].to_string(), "views is 21, above the limit of 10");
    }

    #[test]
    fn test_default_thresholds_accept_everything() {
        let record = MetricsRecord {
            custom_sql: true,
            dashboards: 100,
            views: 1000,
            ..Default::default()
        };
        assert!(Thresholds::default().check(&record).is_empty());
    }
}
