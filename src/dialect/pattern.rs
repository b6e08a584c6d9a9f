//! Recognizers for operation lines in backend output.

use serde::{Deserialize, Serialize};

use crate::types::operation::OPERATION_MARKER;

/// How a backend announces that it executed an operation.
///
/// Every variant yields the raw `^name` token; argument lists such as
/// `([{SELF}])` are cut off at the first `(`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationPattern {
    /// The line starts with `prefix`; the token is the first marked word
    /// after it. OpenNARS: `EXE: $0.10;0.00;0.50$ ^left([{SELF}])=null`.
    Prefixed { prefix: String },
    /// The line itself starts with the marker; the token is its first word.
    /// ONA: `^right executed with args`.
    Leading,
    /// The line contains `keyword` anywhere; the token is the first marked
    /// word after it. NARS-Python: `EXE: ^left based on desirability: 0.9`.
    Contains { keyword: String },
}

impl OperationPattern {
    /// Raw token announced by `line`, if any.
    pub fn detect<'a>(&self, line: &'a str) -> Option<&'a str> {
        let line = line.trim_end_matches(['\r', '\n']);
        let token = match self {
            OperationPattern::Prefixed { prefix } => {
                let rest = line.strip_prefix(prefix.as_str())?;
                first_marked_word(rest)?
            }
            OperationPattern::Leading => {
                if !line.starts_with(OPERATION_MARKER) {
                    return None;
                }
                line.split_whitespace().next()?
            }
            OperationPattern::Contains { keyword } => {
                let at = line.find(keyword.as_str())?;
                first_marked_word(&line[at + keyword.len()..])?
            }
        };
        let token = strip_arguments(token);
        if token.len() <= OPERATION_MARKER.len_utf8() {
            return None;
        }
        Some(token)
    }
}

fn first_marked_word(s: &str) -> Option<&str> {
    s.split_whitespace().find(|w| w.starts_with(OPERATION_MARKER))
}

fn strip_arguments(token: &str) -> &str {
    match token.find('(') {
        Some(i) => &token[..i],
        None => token,
    }
}
