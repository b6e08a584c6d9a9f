//! Bridge configuration.
//!
//! Values can come from YAML or JSON (file or string) and be overridden by
//! `NARS_BRIDGE_*` environment variables. Every field has a default, so an
//! empty document is a valid configuration.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utilities::errors::{BridgeError, Result};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "NARS_BRIDGE_";

/// Default soft limit on queued outbound lines before a warning is logged.
pub const DEFAULT_QUEUE_SOFT_LIMIT: usize = 0xff;

/// Shell used to host the backend.
///
/// The backend is not spawned directly: a shell is started and the dialect's
/// startup lines are typed into it, the same way a user would at a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Shell executable (`sh` on unix, `cmd` on windows).
    pub program: String,
    /// Extra arguments passed to the shell.
    pub args: Vec<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let program = if cfg!(windows) { "cmd" } else { "sh" };
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }
}

impl ShellConfig {
    /// Human-readable command line, used in logs and errors.
    pub fn command_line(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

/// Configuration for launching and talking to a reasoning backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Shell hosting the backend process.
    pub shell: ShellConfig,
    /// Path of the OpenNARS jar.
    pub opennars_jar: String,
    /// Maximum JVM heap handed to OpenNARS (`-Xmx`).
    pub java_heap: String,
    /// Path of the ONA executable.
    pub ona_exe: String,
    /// Path of the legacy ONA executable.
    pub ona_old_exe: String,
    /// Path of the NARS-Python executable.
    pub python_exe: String,
    /// Queue length above which a backpressure warning is logged.
    pub queue_soft_limit: usize,
    /// Directive sent after startup to silence the backend's trace output.
    pub quiet_directive: String,
    /// Overrides the dialect's reasoning step frequency when set.
    pub step_frequency: Option<u32>,
    /// Extra raw-token aliases merged into every profile's alias table.
    pub aliases: HashMap<String, String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        let (ona, ona_old, python) = if cfg!(windows) {
            (r".\NAR.exe", r".\NAR_old.exe", r".\main.exe")
        } else {
            ("./NAR", "./NAR_old", "./main")
        };
        Self {
            shell: ShellConfig::default(),
            opennars_jar: "opennars.jar".to_string(),
            java_heap: "1024m".to_string(),
            ona_exe: ona.to_string(),
            ona_old_exe: ona_old.to_string(),
            python_exe: python.to_string(),
            queue_soft_limit: DEFAULT_QUEUE_SOFT_LIMIT,
            quiet_directive: "*volume=0".to_string(),
            step_frequency: None,
            aliases: HashMap::new(),
        }
    }
}

impl BridgeConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Parse a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_yaml_str(&contents)
        }
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `NARS_BRIDGE_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(shell) = var("SHELL") {
            let mut parts = shell.split_whitespace().map(str::to_string);
            if let Some(program) = parts.next() {
                self.shell = ShellConfig {
                    program,
                    args: parts.collect(),
                };
            }
        }
        if let Some(v) = var("OPENNARS_JAR") {
            self.opennars_jar = v;
        }
        if let Some(v) = var("JAVA_HEAP") {
            self.java_heap = v;
        }
        if let Some(v) = var("ONA_EXE") {
            self.ona_exe = v;
        }
        if let Some(v) = var("ONA_OLD_EXE") {
            self.ona_old_exe = v;
        }
        if let Some(v) = var("PYTHON_EXE") {
            self.python_exe = v;
        }
        if let Some(v) = var("QUIET_DIRECTIVE") {
            self.quiet_directive = v;
        }
        if let Some(v) = var("QUEUE_SOFT_LIMIT") {
            self.queue_soft_limit = v.trim().parse().map_err(|e| {
                BridgeError::Config(format!("{}QUEUE_SOFT_LIMIT={:?}: {}", ENV_PREFIX, v, e))
            })?;
        }
        if let Some(v) = var("STEP_FREQUENCY") {
            let n: u32 = v.trim().parse().map_err(|e| {
                BridgeError::Config(format!("{}STEP_FREQUENCY={:?}: {}", ENV_PREFIX, v, e))
            })?;
            self.step_frequency = Some(n);
        }
        Ok(())
    }
}
