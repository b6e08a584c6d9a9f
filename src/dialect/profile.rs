//! Per-backend sentence templates and parsing rules.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::dialect::pattern::OperationPattern;
use crate::types::operation::{Operation, OPERATION_MARKER};

static PLACEHOLDER_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder pattern"));

/// NAL sentence templates for one backend.
///
/// Placeholders are `{object}`, `{state}`, `{name}` and `{op}` (the decorated
/// `^name` token). Any other brace group, such as `{SELF}` or ONA's `{0}`
/// truth value, is literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceTemplates {
    /// "object has property": `{object}`, `{state}`.
    pub sense: String,
    /// "self should reach goal": `{name}`.
    pub goal: String,
    /// "self should avoid goal": `{name}`.
    pub negative_goal: String,
    /// "goal reached": `{name}`.
    pub praise: String,
    /// "goal not reached": `{name}`.
    pub punish: String,
    /// "self executed operation": `{op}`. `None` if the backend chokes on it.
    pub babble: Option<String>,
    /// "self can execute operation": `{op}`. `None` if unsupported.
    pub register: Option<String>,
}

/// Immutable description of one reasoning backend's protocol.
///
/// Profiles are shared between agents behind an `Arc` and never mutated once
/// built; the `with_*` methods consume and return the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectProfile {
    name: String,
    templates: SentenceTemplates,
    pattern: OperationPattern,
    /// Cycles requested per tick; 0 means the backend paces itself.
    step_frequency: u32,
    /// Bare raw name -> canonical name.
    aliases: HashMap<String, String>,
    /// Lines typed into the host shell to start the backend.
    startup: Vec<String>,
    /// Sent after startup to turn down trace output.
    quiet_directive: Option<String>,
    /// Output lines containing this word are logged for diagnosis.
    diagnostic_keyword: Option<String>,
}

impl DialectProfile {
    /// Create a profile with no stepping, aliases, startup lines or quiet
    /// directive.
    ///
    /// # Arguments
    /// * `name` - Backend name used in log lines.
    /// * `templates` - Sentence shapes for this backend.
    /// * `pattern` - Recognizer for "operation executed" output lines.
    pub fn new(name: impl Into<String>, templates: SentenceTemplates, pattern: OperationPattern) -> Self {
        Self {
            name: name.into(),
            templates,
            pattern,
            step_frequency: 0,
            aliases: HashMap::new(),
            startup: Vec::new(),
            quiet_directive: None,
            diagnostic_keyword: None,
        }
    }

    /// Cycles to request per tick. `0` disables explicit stepping.
    pub fn with_step_frequency(mut self, cycles: u32) -> Self {
        self.step_frequency = cycles;
        self
    }

    /// Map a raw token (with or without marker) onto a canonical name.
    pub fn with_alias(mut self, raw: &str, canonical: &str) -> Self {
        self.aliases.insert(
            raw.trim_start_matches(OPERATION_MARKER).to_string(),
            canonical.trim_start_matches(OPERATION_MARKER).to_string(),
        );
        self
    }

    /// Append a line typed into the host shell at launch.
    pub fn with_startup(mut self, line: impl Into<String>) -> Self {
        self.startup.push(line.into());
        self
    }

    /// Replace all startup lines.
    pub fn with_startup_commands(mut self, lines: Vec<String>) -> Self {
        self.startup = lines;
        self
    }

    /// Directive sent after startup to reduce trace output. An empty string
    /// counts as none.
    pub fn with_quiet_directive(mut self, directive: Option<String>) -> Self {
        self.quiet_directive = directive.filter(|d| !d.is_empty());
        self
    }

    /// Output lines containing `keyword` (any case) are logged at debug level.
    pub fn with_diagnostic_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.diagnostic_keyword = Some(keyword.into());
        self
    }

    /// Backend name, e.g. `opennars`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sentence templates.
    pub fn templates(&self) -> &SentenceTemplates {
        &self.templates
    }

    /// Operation-line recognizer.
    pub fn pattern(&self) -> &OperationPattern {
        &self.pattern
    }

    /// Cycles requested per tick; `0` when the backend paces itself.
    pub fn step_frequency(&self) -> u32 {
        self.step_frequency
    }

    /// Raw bare name -> canonical name.
    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Lines that start the backend inside the host shell.
    pub fn startup_commands(&self) -> &[String] {
        &self.startup
    }

    /// Directive queued right after the startup lines, if any.
    pub fn quiet_directive(&self) -> Option<&str> {
        self.quiet_directive.as_deref()
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// "`object` is `state` now".
    pub fn render_sense(&self, object: &str, state: &str) -> String {
        render_template(&self.templates.sense, &[("object", object), ("state", state)])
    }

    /// "self should reach `name`", or avoid it when `negative`.
    ///
    /// # Arguments
    /// * `name` - Goal name.
    /// * `negative` - Render the avoidance form instead.
    pub fn render_goal(&self, name: &str, negative: bool) -> String {
        let template = if negative {
            &self.templates.negative_goal
        } else {
            &self.templates.goal
        };
        render_template(template, &[("name", name)])
    }

    /// "`name` has been reached".
    pub fn render_praise(&self, name: &str) -> String {
        render_template(&self.templates.praise, &[("name", name)])
    }

    /// "`name` has not been reached", with the dialect's negative truth value.
    pub fn render_punish(&self, name: &str) -> String {
        render_template(&self.templates.punish, &[("name", name)])
    }

    /// `None` when the backend cannot take self-reported actions.
    pub fn render_babble(&self, operation: &Operation) -> Option<String> {
        let template = self.templates.babble.as_deref()?;
        Some(render_template(template, &[("op", &operation.token())]))
    }

    /// `None` when the backend has no way to announce available operations.
    pub fn render_register(&self, operation: &Operation) -> Option<String> {
        let template = self.templates.register.as_deref()?;
        Some(render_template(template, &[("op", &operation.token())]))
    }

    /// The reasoning step command, or `None` for self-pacing backends.
    pub fn render_step(&self) -> Option<String> {
        (self.step_frequency > 0).then(|| self.step_frequency.to_string())
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Raw operation token carried by an output line, if any.
    pub fn detect_operation<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.pattern.detect(line)
    }

    /// Resolve a raw token to its canonical operation.
    ///
    /// Strips the marker, applies the alias table and validates the result.
    /// Returns `None` for tokens that do not name a usable operation.
    pub fn canonicalize(&self, raw: &str) -> Option<Operation> {
        let bare = raw.trim().trim_start_matches(OPERATION_MARKER);
        let name = self.aliases.get(bare).map(String::as_str).unwrap_or(bare);
        if !Operation::is_valid_name(name) {
            log::debug!("[{}] dropping unrecognized operation token {:?}", self.name, raw);
            return None;
        }
        Some(Operation::new(name))
    }

    /// Whether an output line should be surfaced in the debug log.
    pub fn is_diagnostic(&self, line: &str) -> bool {
        match &self.diagnostic_keyword {
            Some(keyword) => line.to_lowercase().contains(&keyword.to_lowercase()),
            None => false,
        }
    }
}

/// Substitute `{key}` groups in one pass. Unknown groups are kept verbatim
/// and substituted values are never rescanned.
///
/// # Arguments
/// * `template` - Sentence template with `{key}` placeholders.
/// * `vars` - Placeholder values by key.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_PATTERN
        .replace_all(template, |caps: &Captures| {
            let key = &caps[1];
            match vars.iter().find(|(k, _)| *k == key) {
                Some((_, value)) => (*value).to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}
