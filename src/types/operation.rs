//! Canonical operation identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker that decorates operation terms in NAL sentences.
pub const OPERATION_MARKER: char = '^';

/// An executable action known to the reasoning backend.
///
/// Only the bare name is stored, so equality and hashing are by name. The
/// decorated `^name` form exists solely for rendering sentences and is what
/// `Display` produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Operation {
    name: String,
}

impl Operation {
    /// Create an operation from its bare name.
    ///
    /// A name that still carries the `^` marker is accepted, but the marker
    /// is stripped and a warning is logged since it usually means a token
    /// was not canonicalized before use.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.starts_with(OPERATION_MARKER) {
            log::warn!("operation name {:?} carries a '{}' marker", name, OPERATION_MARKER);
            let bare = name.trim_start_matches(OPERATION_MARKER).to_string();
            return Self { name: bare };
        }
        Self { name }
    }

    /// Bare name, e.g. `left`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Decorated term used inside sentences, e.g. `^left`.
    pub fn token(&self) -> String {
        format!("{}{}", OPERATION_MARKER, self.name)
    }

    /// Whether `name` is usable as a bare operation name.
    ///
    /// Names must be non-empty and made of ASCII alphanumerics, `_` or `-`.
    pub fn is_valid_name(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", OPERATION_MARKER, self.name)
    }
}

impl From<&str> for Operation {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Operation {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for Operation {
    fn as_ref(&self) -> &str {
        &self.name
    }
}
