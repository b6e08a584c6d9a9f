//! Backend dialects.
//!
//! Each NARS implementation speaks a slightly different variant of Narsese:
//! punctuation for negative truth values, which sentences crash the process,
//! and the shape of its "operation executed" output lines. A
//! [`DialectProfile`] captures all of it as data so the bridge never branches
//! on which backend it is talking to.
//!
//! The supported backends are enumerated by [`DialectKind`]; its
//! [`profile`](DialectKind::profile) method builds the matching profile from
//! a [`BridgeConfig`].

pub mod builtin;
pub mod pattern;
pub mod profile;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use pattern::OperationPattern;
pub use profile::{DialectProfile, SentenceTemplates};

use crate::utilities::config::BridgeConfig;
use crate::utilities::errors::BridgeError;

// ---------------------------------------------------------------------------
// DialectKind
// ---------------------------------------------------------------------------

/// Known reasoning backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialectKind {
    /// OpenNARS (Java).
    #[default]
    OpenNars,
    /// OpenNARS for Applications.
    Ona,
    /// Legacy ONA build.
    OnaOld,
    /// NARS-Python.
    Python,
}

impl DialectKind {
    /// All kinds, in menu order.
    pub const ALL: [DialectKind; 4] = [
        DialectKind::OpenNars,
        DialectKind::Ona,
        DialectKind::OnaOld,
        DialectKind::Python,
    ];

    pub fn value(&self) -> &'static str {
        match self {
            DialectKind::OpenNars => "opennars",
            DialectKind::Ona => "ONA",
            DialectKind::OnaOld => "ONA_old",
            DialectKind::Python => "python",
        }
    }

    /// Parse case-insensitively; `-` and `_` are interchangeable.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "opennars" => Some(DialectKind::OpenNars),
            "ona" => Some(DialectKind::Ona),
            "ona_old" => Some(DialectKind::OnaOld),
            "python" | "nars_python" => Some(DialectKind::Python),
            _ => None,
        }
    }

    /// Build this backend's profile, applying configuration overrides.
    pub fn profile(&self, config: &BridgeConfig) -> DialectProfile {
        let base = match self {
            DialectKind::OpenNars => builtin::opennars(config),
            DialectKind::Ona => builtin::ona(config),
            DialectKind::OnaOld => builtin::ona_old(config),
            DialectKind::Python => builtin::python(config),
        };
        let mut profile = base.with_quiet_directive(Some(config.quiet_directive.clone()));
        if let Some(cycles) = config.step_frequency {
            profile = profile.with_step_frequency(cycles);
        }
        for (raw, canonical) in &config.aliases {
            profile = profile.with_alias(raw, canonical);
        }
        profile
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

impl FromStr for DialectKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_opt(s).ok_or_else(|| BridgeError::UnknownDialect(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parsing() {
        assert_eq!(DialectKind::from_str_opt("opennars"), Some(DialectKind::OpenNars));
        assert_eq!(DialectKind::from_str_opt("ONA"), Some(DialectKind::Ona));
        assert_eq!(DialectKind::from_str_opt("ona-old"), Some(DialectKind::OnaOld));
        assert_eq!(DialectKind::from_str_opt("ONA_old"), Some(DialectKind::OnaOld));
        assert_eq!(DialectKind::from_str_opt(" Python "), Some(DialectKind::Python));
        assert_eq!(DialectKind::from_str_opt("prolog"), None);
    }

    #[test]
    fn test_kind_from_str_error() {
        let err = "prolog".parse::<DialectKind>().unwrap_err();
        assert!(matches!(err, BridgeError::UnknownDialect(s) if s == "prolog"));
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in DialectKind::ALL {
            assert_eq!(DialectKind::from_str_opt(&kind.to_string()), Some(kind));
        }
    }

    #[test]
    fn test_sense_is_never_an_operation() {
        let config = BridgeConfig::default();
        let senses = [
            ("enemy", "left"),
            ("enemy", "right"),
            ("enemy", "ahead"),
            ("SELF", "good"),
            ("EXE", "busy"),
        ];
        for kind in DialectKind::ALL {
            let profile = kind.profile(&config);
            for (object, state) in senses {
                let line = profile.render_sense(object, state);
                assert_eq!(profile.detect_operation(&line), None, "{}: {}", kind, line);
            }
        }
    }

    #[test]
    fn test_goals_and_reinforcement_are_never_operations() {
        let config = BridgeConfig::default();
        for kind in DialectKind::ALL {
            let p = kind.profile(&config);
            for line in [
                p.render_goal("good", false),
                p.render_goal("bad", true),
                p.render_praise("good"),
                p.render_punish("good"),
            ] {
                assert_eq!(p.detect_operation(&line), None, "{}: {}", kind, line);
            }
        }
    }

    #[test]
    fn test_config_overrides_apply() {
        let mut config = BridgeConfig::default();
        config.step_frequency = Some(2);
        config.quiet_directive = "*volume=10".to_string();
        config.aliases.insert("^halt".to_string(), "deactivate".to_string());

        let p = DialectKind::Ona.profile(&config);
        assert_eq!(p.step_frequency(), 2);
        assert_eq!(p.quiet_directive(), Some("*volume=10"));
        assert_eq!(p.canonicalize("^halt").unwrap().name(), "deactivate");
    }

    #[test]
    fn test_default_kind_is_opennars() {
        assert_eq!(DialectKind::default(), DialectKind::OpenNars);
    }

    #[test]
    fn test_default_step_frequencies() {
        let config = BridgeConfig::default();
        assert_eq!(DialectKind::OpenNars.profile(&config).step_frequency(), 5);
        assert_eq!(DialectKind::Ona.profile(&config).step_frequency(), 0);
        assert_eq!(DialectKind::Python.profile(&config).step_frequency(), 0);
    }
}
