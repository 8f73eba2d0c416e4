//! Classify → plan → pre-flight → run → record.
//!
//! ```text
//! free text
//!     │
//!     ▼
//! Classifier      ← ordered rules, first match wins
//!     │
//!     ▼
//! planner::plan   ← catalog templates with the target substituted
//!     │
//!     ▼
//! pre-flight      ← every required executable on PATH, else ToolMissing
//!     │
//!     ▼
//! Runner          ← one child per step, confirmations on conflict/failure
//!     │
//!     ▼
//! ProgressStore   ← progress delta + history entries
//! ```

use crate::classifier::{Category, Classifier, Intent};
use crate::error::{Result, SpoonError};
use crate::planner::{self, ExecutionStep};
use crate::prompt::Confirm;
use crate::runner::{PlanOutcome, Runner};
use crate::store::ProgressStore;
use crate::suggest::suggest;
use crate::types::{ActionKind, HistoryKind, ToolAction};
use serde::Serialize;

/// Turns a natural-language request into a single shell command.
pub trait CommandTranslator {
    fn translate(&self, request: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// RouteOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RouteOutcome {
    /// Nothing to run for this text.
    NoOperation { intent: Intent },
    /// A question; the caller hands it to the assistant.
    Conversation { intent: Intent },
    Ran {
        intent: Intent,
        steps: Vec<ExecutionStep>,
        outcome: PlanOutcome,
        /// True when the command came from the translator.
        translated: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        remedy: Option<&'static str>,
    },
}

impl RouteOutcome {
    pub fn intent(&self) -> &Intent {
        match self {
            RouteOutcome::NoOperation { intent }
            | RouteOutcome::Conversation { intent }
            | RouteOutcome::Ran { intent, .. } => intent,
        }
    }

    pub fn success(&self) -> bool {
        match self {
            RouteOutcome::NoOperation { .. } => false,
            RouteOutcome::Conversation { .. } => true,
            RouteOutcome::Ran { outcome, .. } => outcome.success(),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Text that reads like a sentence rather than a command line. Short input,
/// flags, and shell operators all mean it is already a command.
pub fn looks_like_natural_language(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= 2 {
        return false;
    }
    let shell_syntax = ["|", "&&", "||", ">", "<", ";", "$(", "`"];
    !words.iter().any(|w| w.starts_with('-')) && !shell_syntax.iter().any(|s| text.contains(s))
}

pub fn install_hint(tool: &str) -> String {
    match tool {
        "npx" | "npm" | "node" => "install Node.js from https://nodejs.org".to_string(),
        "python3" | "python" | "pip" | "pip3" => {
            "install Python 3 from https://www.python.org".to_string()
        }
        "django-admin" => "run 'pip install django'".to_string(),
        "docker" => "install Docker from https://docs.docker.com/get-docker/".to_string(),
        "netlify" => "run 'npm install -g netlify-cli'".to_string(),
        "vercel" => "run 'npm install -g vercel'".to_string(),
        "aws" => "install the AWS CLI from https://aws.amazon.com/cli/".to_string(),
        other => format!("install '{other}' and make sure it is on PATH"),
    }
}

enum Translation {
    /// No attempt was made; nothing to charge.
    Skipped,
    Failed,
    Command(String),
}

fn tool_on_path(tool: &str) -> bool {
    which::which(tool).is_ok()
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub struct Router<'t, C: Confirm> {
    classifier: Classifier,
    runner: Runner<C>,
    translator: Option<&'t dyn CommandTranslator>,
    tool_check: fn(&str) -> bool,
}

impl<'t, C: Confirm> Router<'t, C> {
    pub fn new(runner: Runner<C>) -> Self {
        Self {
            classifier: Classifier::default(),
            runner,
            translator: None,
            tool_check: tool_on_path,
        }
    }

    pub fn with_translator(mut self, translator: &'t dyn CommandTranslator) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Replace the PATH lookup used by the pre-flight check.
    pub fn with_tool_check(mut self, check: fn(&str) -> bool) -> Self {
        self.tool_check = check;
        self
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn into_runner(self) -> Runner<C> {
        self.runner
    }

    pub fn route(&mut self, store: &mut ProgressStore, text: &str) -> Result<RouteOutcome> {
        let intent = self.classifier.classify(text);
        tracing::debug!(category = intent.category.name(), target = %intent.target, "classified");
        self.execute(store, intent)
    }

    /// Plan and run an already-classified intent.
    pub fn execute(&mut self, store: &mut ProgressStore, intent: Intent) -> Result<RouteOutcome> {
        match intent.category {
            Category::Question => return Ok(RouteOutcome::Conversation { intent }),
            Category::General => return Ok(RouteOutcome::NoOperation { intent }),
            _ => {}
        }

        let mut steps = planner::plan(&intent);
        if steps.is_empty() {
            return Ok(RouteOutcome::NoOperation { intent });
        }

        let mut translated = false;
        let mut charge = false;
        if intent.category == Category::SystemCommand {
            match self.translate(store, &steps[0].command) {
                Translation::Skipped => {}
                Translation::Failed => charge = true,
                Translation::Command(command) => {
                    steps = vec![ExecutionStep::shell(&command)];
                    translated = true;
                    charge = true;
                }
            }
        }

        self.preflight(&steps)?;

        // The attempt is paid for only once the plan is known to be runnable.
        if charge && !store.consume_token() {
            tracing::warn!("token balance reached zero before the translation was charged");
        }

        let delta = match (intent.category, translated) {
            (Category::SystemCommand, true) => ActionKind::Harness,
            (Category::SystemCommand, false) => ActionKind::HarnessFallback,
            _ => ActionKind::Route,
        };
        store.advance_for(delta);

        let outcome = self.runner.run_plan(&steps);
        let remedy = outcome
            .failures()
            .next()
            .and_then(|f| f.failure_text())
            .map(|text| suggest(&text));

        record_outcome(store, &intent, &steps, &outcome, remedy);

        Ok(RouteOutcome::Ran {
            intent,
            steps,
            outcome,
            translated,
            remedy,
        })
    }

    /// Translation is attempted only for sentence-like input with a
    /// translator configured and a token to spend. Any failure means the
    /// literal text runs instead. The token is not debited here.
    fn translate(&self, store: &ProgressStore, literal: &str) -> Translation {
        let Some(translator) = self.translator else {
            return Translation::Skipped;
        };
        if !looks_like_natural_language(literal) {
            return Translation::Skipped;
        }
        if store.state().token_balance == 0 {
            tracing::warn!("token balance exhausted; running the command as typed");
            return Translation::Skipped;
        }
        match translator.translate(literal) {
            Ok(command) if !command.trim().is_empty() => {
                tracing::info!(from = %literal, to = %command, "translated request");
                Translation::Command(command)
            }
            Ok(_) => {
                tracing::warn!("translator returned nothing; running the command as typed");
                Translation::Failed
            }
            Err(e) => {
                tracing::warn!("translation failed ({e}); running the command as typed");
                Translation::Failed
            }
        }
    }

    fn preflight(&self, steps: &[ExecutionStep]) -> Result<()> {
        for tool in steps.iter().filter_map(|s| s.requires.as_deref()) {
            if !(self.tool_check)(tool) {
                return Err(SpoonError::ToolMissing {
                    tool: tool.to_string(),
                    hint: install_hint(tool),
                });
            }
        }
        Ok(())
    }
}

fn record_outcome(
    store: &mut ProgressStore,
    intent: &Intent,
    steps: &[ExecutionStep],
    outcome: &PlanOutcome,
    remedy: Option<&'static str>,
) {
    let subject = format!("{} {}", intent.category.name(), intent.target);
    store.record(
        HistoryKind::Operations,
        &subject,
        Some(outcome.status.as_str()),
    );

    if let Some(remedy) = remedy {
        store.record(HistoryKind::Insights, &subject, Some(remedy));
    }

    if !outcome.success() {
        return;
    }

    let detail = intent.category.detail();
    match intent.category {
        Category::FullStack { .. }
        | Category::HtmlSite
        | Category::ReactCreate
        | Category::Tool {
            action: ToolAction::Create,
            ..
        } => store.record(HistoryKind::Projects, &intent.target, Some(intent.category.name())),
        Category::PythonAi { .. } => {
            store.record(HistoryKind::Environments, &intent.target, detail.as_deref());
            store.record(HistoryKind::Projects, &intent.target, Some(intent.category.name()));
        }
        Category::Deploy { .. } => {
            store.record(HistoryKind::Deployments, &intent.target, detail.as_deref())
        }
        Category::SystemCommand => {
            let program = steps
                .first()
                .and_then(|s| s.command.split_whitespace().next())
                .unwrap_or_default();
            if !program.is_empty() {
                store.record(HistoryKind::Harnessed, program, None);
            }
        }
        Category::Tool { .. } | Category::Question | Category::General => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
