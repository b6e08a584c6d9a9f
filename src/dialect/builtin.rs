//! Built-in profiles for the supported NARS implementations.

use crate::dialect::pattern::OperationPattern;
use crate::dialect::profile::{DialectProfile, SentenceTemplates};
use crate::utilities::config::BridgeConfig;

/// Sense/goal/praise shapes shared by the angle-bracket dialects.
fn angle_templates(punish: &str, babble: Option<&str>, register: Option<&str>) -> SentenceTemplates {
    SentenceTemplates {
        sense: "<{{object}} --> [{state}]>. :|:".to_string(),
        goal: "<{SELF} --> [{name}]>! :|:".to_string(),
        negative_goal: "(--, <{SELF} --> [{name}]>)! :|:".to_string(),
        praise: "<{SELF} --> [{name}]>. :|:".to_string(),
        punish: punish.to_string(),
        babble: babble.map(str::to_string),
        register: register.map(str::to_string),
    }
}

/// OpenNARS (Java). Needs explicit cycle steps; supports babbling.
pub fn opennars(config: &BridgeConfig) -> DialectProfile {
    let babble = "<(*,{SELF}) --> {op}>. :|:";
    let templates = angle_templates("<{SELF} --> [{name}]>. :|: %0%", Some(babble), Some(babble));
    let pattern = OperationPattern::Prefixed {
        prefix: "EXE".to_string(),
    };
    DialectProfile::new("opennars", templates, pattern)
        .with_step_frequency(5)
        .with_alias("stop", "deactivate")
        .with_startup(format!("java -Xmx{} -jar {}", config.java_heap, config.opennars_jar))
}

/// OpenNARS for Applications (C). Paces itself.
///
/// A self-reported operation such as `<(*,{SELF}) --> ^deactivate>. :|:`
/// makes ONA reject the input and close its pipe, so babbling is declared
/// unsupported.
pub fn ona(config: &BridgeConfig) -> DialectProfile {
    ona_with_exe("ona", &config.ona_exe)
}

/// Older ONA build, same grammar.
pub fn ona_old(config: &BridgeConfig) -> DialectProfile {
    ona_with_exe("ona_old", &config.ona_old_exe)
}

fn ona_with_exe(name: &str, exe: &str) -> DialectProfile {
    let templates = angle_templates(
        "<{SELF} --> [{name}]>. :|: {0}",
        None,
        Some("(*,{SELF}, {op}). :|:"),
    );
    DialectProfile::new(name, templates, OperationPattern::Leading)
        .with_alias("stop", "deactivate")
        .with_startup(format!("{} shell", exe))
}

/// NARS-Python. Round-bracket statements; only accepts sentences, so no
/// stepping.
pub fn python(config: &BridgeConfig) -> DialectProfile {
    let babble = "((*, {SELF}) --> {op}). :|:";
    let templates = SentenceTemplates {
        sense: "({{object}} --> [{state}]). :|:".to_string(),
        goal: "({SELF} --> [{name}])! :|:".to_string(),
        negative_goal: "({SELF} --> (-, [{name}]))! :|:".to_string(),
        praise: "({SELF} --> [{name}]). :|:".to_string(),
        punish: "({SELF} --> [{name}]). :|: %0.00;0.90%".to_string(),
        babble: Some(babble.to_string()),
        register: Some(babble.to_string()),
    };
    let pattern = OperationPattern::Contains {
        keyword: "EXE".to_string(),
    };
    DialectProfile::new("python", templates, pattern)
        .with_diagnostic_keyword("reject")
        .with_startup(config.python_exe.clone())
}
