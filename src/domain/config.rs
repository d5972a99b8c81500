// Logging configuration record.
// Owned and persisted by the host; the engine only reads it for the duration
// of one operation.

use serde::{Deserialize, Serialize};

/// Logging framework the rendered statements target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameworkId {
    Println,
    Timber,
    Napier,
}

impl FrameworkId {
    /// Parse framework from string (CLI input).
    pub fn from_str(s: &str) -> Option<FrameworkId> {
        match s.to_lowercase().as_str() {
            "println" => Some(FrameworkId::Println),
            "timber" => Some(FrameworkId::Timber),
            "napier" => Some(FrameworkId::Napier),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FrameworkId::Println => "System Println",
            FrameworkId::Timber => "Timber",
            FrameworkId::Napier => "Napier",
        }
    }
}

impl Default for FrameworkId {
    fn default() -> Self {
        FrameworkId::Println
    }
}

impl std::fmt::Display for FrameworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-project settings read at the start of each operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfiguration {
    pub track_method_execution: bool,
    pub track_assignments: bool,
    pub log_tag: String,
    pub framework: FrameworkId,
}

impl Default for LoggingConfiguration {
    fn default() -> Self {
        Self {
            track_method_execution: true,
            track_assignments: true,
            log_tag: "Myfancy log".to_string(),
            framework: FrameworkId::Println,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = LoggingConfiguration::default();
        assert!(cfg.track_method_execution);
        assert!(cfg.track_assignments);
        assert_eq!(cfg.log_tag, "Myfancy log");
        assert_eq!(cfg.framework, FrameworkId::Println);
    }

    #[test]
    fn test_framework_from_str() {
        assert_eq!(FrameworkId::from_str("println"), Some(FrameworkId::Println));
        assert_eq!(FrameworkId::from_str("TIMBER"), Some(FrameworkId::Timber));
        assert_eq!(FrameworkId::from_str("napier"), Some(FrameworkId::Napier));
        assert_eq!(FrameworkId::from_str("log4j"), None);
    }

    #[test]
    fn test_toml_round_trip() {
        let cfg = LoggingConfiguration {
            track_method_execution: false,
            track_assignments: true,
            log_tag: "TestTag".to_string(),
            framework: FrameworkId::Timber,
        };
        let serialized = toml::to_string(&cfg).unwrap();
        let parsed: LoggingConfiguration = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let parsed: LoggingConfiguration = toml::from_str("log_tag = \"X\"").unwrap();
        assert_eq!(parsed.log_tag, "X");
        assert!(parsed.track_method_execution);
        assert_eq!(parsed.framework, FrameworkId::Println);
    }
}
