use crate::catalog::{self, CommandTemplate};
use crate::classifier::{Category, Intent};
use crate::types::PythonKind;
use serde::Serialize;

/// Words that are shell syntax or builtins rather than programs on PATH.
const SHELL_BUILTINS: &[&str] = &[
    ".", "alias", "cd", "echo", "exit", "export", "false", "printf", "pwd", "set", "source",
    "test", "true", "type", "unset",
];

/// One shell invocation the runner will perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionStep {
    pub label: String,
    pub command: String,
    /// Directory the step creates; an existing one triggers a confirmation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creates_dir: Option<String>,
    /// Executable checked on PATH before anything runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<&'static str>,
}

impl ExecutionStep {
    pub fn from_template(t: &CommandTemplate, name: &str) -> Self {
        Self {
            label: format!("{}: {}", t.human_name, t.description),
            command: t.render(name),
            creates_dir: t.render_creates(name),
            requires: t.requires.map(str::to_string),
            template: Some(t.id),
        }
    }

    /// A literal shell command. The program name is taken as the requirement
    /// when it is a bare word.
    pub fn shell(command: &str) -> Self {
        let command = command.trim();
        let program = command
            .split_whitespace()
            .next()
            .filter(|p| !SHELL_BUILTINS.contains(p))
            .filter(|p| {
                p.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            })
            .map(str::to_string);
        Self {
            label: format!("shell: {command}"),
            command: command.to_string(),
            creates_dir: None,
            requires: program,
            template: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Trigger stripping
// ---------------------------------------------------------------------------

/// Phrases that mark a system command; the command is whatever follows.
const TRIGGERS: &[&str] = &["run command", "execute", "shell", "terminal", "harness"];

/// Remove a leading trigger phrase from `text`. The trigger must be a whole
/// word: "shelling out" is left alone.
pub fn strip_trigger(text: &str) -> &str {
    let text = text.trim();
    let lower = text.to_ascii_lowercase();
    for trigger in TRIGGERS {
        let Some(rest) = lower.strip_prefix(trigger) else {
            continue;
        };
        if rest
            .chars()
            .next()
            .map_or(true, |c| c.is_whitespace() || c == ':')
        {
            return text[trigger.len()..].trim_start().trim_start_matches(':').trim();
        }
    }
    text
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

fn from_ids(ids: &[&str], name: &str) -> Vec<ExecutionStep> {
    ids.iter()
        .filter_map(|id| catalog::lookup(id))
        .map(|t| ExecutionStep::from_template(t, name))
        .collect()
}

/// Steps for a python environment of `kind` named `name`.
pub fn plan_python(kind: PythonKind, name: &str) -> Vec<ExecutionStep> {
    from_ids(&[catalog::python_template(kind)], name)
}

/// Map an intent to its ordered steps. Questions and general text produce
/// an empty plan.
pub fn plan(intent: &Intent) -> Vec<ExecutionStep> {
    let name = intent.target.as_str();
    match intent.category {
        Category::Question | Category::General => Vec::new(),
        Category::FullStack { frontend, backend } => from_ids(
            &[
                catalog::frontend_template(frontend),
                catalog::backend_template(backend),
            ],
            name,
        ),
        Category::PythonAi { kind } => plan_python(kind, name),
        Category::SystemCommand => {
            let command = strip_trigger(&intent.text);
            if command.is_empty() {
                Vec::new()
            } else {
                vec![ExecutionStep::shell(command)]
            }
        }
        Category::HtmlSite => from_ids(&["html-site"], name),
        Category::ReactCreate => from_ids(&["react-app"], name),
        Category::Deploy { provider } => from_ids(&[catalog::deploy_template(provider)], name),
        Category::Tool { tool, action } => {
            vec![ExecutionStep::from_template(
                catalog::tool_template(tool, action),
                name,
            )]
        }
    }
}
