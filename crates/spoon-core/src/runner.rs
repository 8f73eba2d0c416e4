//! Sequential execution of a plan, one child process per step.
//!
//! Each step runs through the platform shell with inherited stdio, so tool
//! output streams to the terminal as it is produced. Two situations stop and
//! ask the operator: a step would create a directory that already exists,
//! and a step failed while more steps remain.

use crate::planner::ExecutionStep;
use crate::prompt::Confirm;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StepState {
    Pending,
    Running,
    Succeeded,
    Failed {
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Skipped,
}

impl StepState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Pending => "pending",
            StepState::Running => "running",
            StepState::Succeeded => "succeeded",
            StepState::Failed { .. } => "failed",
            StepState::Skipped => "skipped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub label: String,
    pub command: String,
    #[serde(flatten)]
    pub state: StepState,
}

impl StepResult {
    /// Text describing the failure, for remediation lookup.
    pub fn failure_text(&self) -> Option<String> {
        match &self.state {
            StepState::Failed {
                error: Some(e), ..
            } => Some(e.clone()),
            StepState::Failed { code, .. } => Some(match code {
                Some(127) => "command not found".to_string(),
                Some(126) => "permission denied".to_string(),
                Some(c) => format!("exited with status {c}"),
                None => "terminated by signal".to_string(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// Every step succeeded.
    Completed,
    /// Ran to the end with at least one failure and at least one success.
    Partial,
    /// Ran to the end and nothing succeeded.
    Failed,
    /// Operator declined to overwrite an existing directory.
    Cancelled,
    /// Operator declined to continue after a failure.
    Halted,
    /// Nothing to run.
    Empty,
}

impl PlanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Completed => "completed",
            PlanStatus::Partial => "partial",
            PlanStatus::Failed => "failed",
            PlanStatus::Cancelled => "cancelled",
            PlanStatus::Halted => "halted",
            PlanStatus::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanOutcome {
    pub status: PlanStatus,
    pub steps: Vec<StepResult>,
}

impl PlanOutcome {
    pub fn success(&self) -> bool {
        self.status == PlanStatus::Completed
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepResult> {
        self.steps
            .iter()
            .filter(|s| matches!(s.state, StepState::Failed { .. }))
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

pub struct Runner<C: Confirm> {
    cwd: PathBuf,
    step_delay: Duration,
    confirm: C,
}

impl<C: Confirm> Runner<C> {
    pub fn new(cwd: impl Into<PathBuf>, confirm: C) -> Self {
        Self {
            cwd: cwd.into(),
            step_delay: DEFAULT_STEP_DELAY,
            confirm,
        }
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn into_confirm(self) -> C {
        self.confirm
    }

    pub fn run_plan(&mut self, steps: &[ExecutionStep]) -> PlanOutcome {
        if steps.is_empty() {
            return PlanOutcome {
                status: PlanStatus::Empty,
                steps: Vec::new(),
            };
        }

        let mut results: Vec<StepResult> = steps
            .iter()
            .map(|s| StepResult {
                label: s.label.clone(),
                command: s.command.clone(),
                state: StepState::Pending,
            })
            .collect();
        let total = steps.len();
        let mut succeeded = 0usize;

        for (i, step) in steps.iter().enumerate() {
            if i > 0 && !self.step_delay.is_zero() {
                std::thread::sleep(self.step_delay);
            }

            if let Some(dir) = &step.creates_dir {
                if self.cwd.join(dir).exists() {
                    let question = format!("Directory '{dir}' already exists. Continue anyway?");
                    if !self.confirm.confirm(&question) {
                        tracing::info!(dir = %dir, "plan cancelled on existing directory");
                        skip_from(&mut results, i);
                        return PlanOutcome {
                            status: PlanStatus::Cancelled,
                            steps: results,
                        };
                    }
                }
            }

            results[i].state = StepState::Running;
            eprintln!("==> [{}/{}] {}", i + 1, total, step.label);
            tracing::debug!(command = %step.command, "spawning step");

            results[i].state = match self.spawn(&step.command) {
                Ok(status) if status.success() => StepState::Succeeded,
                Ok(status) => StepState::Failed {
                    code: status.code(),
                    error: None,
                },
                Err(e) => StepState::Failed {
                    code: None,
                    error: Some(e.to_string()),
                },
            };

            if results[i].state == StepState::Succeeded {
                succeeded += 1;
                continue;
            }

            tracing::warn!(step = %step.label, "step failed");
            if i + 1 < total && !self.confirm.confirm("Step failed. Continue with remaining steps?")
            {
                skip_from(&mut results, i + 1);
                return PlanOutcome {
                    status: PlanStatus::Halted,
                    steps: results,
                };
            }
        }

        let status = if succeeded == total {
            PlanStatus::Completed
        } else if succeeded == 0 {
            PlanStatus::Failed
        } else {
            PlanStatus::Partial
        };
        PlanOutcome {
            status,
            steps: results,
        }
    }

    fn spawn(&self, command: &str) -> std::io::Result<ExitStatus> {
        shell_command(command)
            .current_dir(&self.cwd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
    }
}

fn skip_from(results: &mut [StepResult], from: usize) {
    for r in &mut results[from..] {
        r.state = StepState::Skipped;
    }
}

#[cfg(windows)]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(command);
    cmd
}

#[cfg(not(windows))]
fn shell_command(command: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);
    cmd
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::prompt::ScriptedConfirm;
    use tempfile::TempDir;

    fn step(label: &str, command: &str) -> ExecutionStep {
        ExecutionStep {
            label: label.to_string(),
            command: command.to_string(),
            creates_dir: None,
            requires: None,
            template: None,
        }
    }

    fn runner(dir: &TempDir, answers: &[bool]) -> Runner<ScriptedConfirm> {
        Runner::new(dir.path(), ScriptedConfirm::new(answers.iter().copied()))
            .with_step_delay(Duration::ZERO)
    }

    #[test]
    fn empty_plan() {
        let dir = TempDir::new().unwrap();
        let outcome = runner(&dir, &[]).run_plan(&[]);
        assert_eq!(outcome.status, PlanStatus::Empty);
        assert!(!outcome.success());
    }

    #[test]
    fn all_steps_succeed() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(&dir, &[]);
        let outcome = r.run_plan(&[step("one", "touch a"), step("two", "touch b")]);
        assert_eq!(outcome.status, PlanStatus::Completed);
        assert!(outcome.success());
        assert!(dir.path().join("a").exists());
        assert!(dir.path().join("b").exists());
        assert!(r.into_confirm().asked.is_empty());
    }

    #[test]
    fn failure_then_no_halts_and_skips_rest() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(&dir, &[false]);
        let outcome = r.run_plan(&[step("one", "exit 3"), step("two", "touch b")]);
        assert_eq!(outcome.status, PlanStatus::Halted);
        assert_eq!(
            outcome.steps[0].state,
            StepState::Failed {
                code: Some(3),
                error: None
            }
        );
        assert_eq!(outcome.steps[1].state, StepState::Skipped);
        assert!(!dir.path().join("b").exists());
        assert_eq!(r.into_confirm().asked.len(), 1);
    }

    #[test]
    fn failure_then_yes_is_partial() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(&dir, &[true]);
        let outcome = r.run_plan(&[step("one", "false"), step("two", "touch b")]);
        assert_eq!(outcome.status, PlanStatus::Partial);
        assert_eq!(outcome.steps[1].state, StepState::Succeeded);
        assert_eq!(outcome.failures().count(), 1);
    }

    #[test]
    fn last_step_failure_does_not_prompt() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(&dir, &[]);
        let outcome = r.run_plan(&[step("only", "exit 1")]);
        assert_eq!(outcome.status, PlanStatus::Failed);
        assert!(r.into_confirm().asked.is_empty());
    }

    #[test]
    fn existing_directory_and_no_cancels_without_spawning() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("foo")).unwrap();
        let mut s = step("create", "touch marker");
        s.creates_dir = Some("foo".to_string());

        let mut r = runner(&dir, &[false]);
        let outcome = r.run_plan(&[s, step("after", "touch after")]);
        assert_eq!(outcome.status, PlanStatus::Cancelled);
        assert_eq!(outcome.steps[0].state, StepState::Skipped);
        assert_eq!(outcome.steps[1].state, StepState::Skipped);
        assert!(!dir.path().join("marker").exists());
        assert!(!dir.path().join("after").exists());
        let asked = r.into_confirm().asked;
        assert!(asked[0].contains("'foo' already exists"));
    }

    #[test]
    fn existing_directory_and_yes_runs() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("foo")).unwrap();
        let mut s = step("create", "touch marker");
        s.creates_dir = Some("foo".to_string());
        let outcome = runner(&dir, &[true]).run_plan(&[s]);
        assert_eq!(outcome.status, PlanStatus::Completed);
        assert!(dir.path().join("marker").exists());
    }

    #[test]
    fn missing_program_maps_to_command_not_found() {
        let dir = TempDir::new().unwrap();
        let outcome = runner(&dir, &[]).run_plan(&[step("x", "definitely-not-a-real-tool-xyz")]);
        let failure = outcome.failures().next().unwrap();
        assert_eq!(failure.failure_text().as_deref(), Some("command not found"));
    }

    #[test]
    fn runs_in_configured_directory() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("work");
        std::fs::create_dir(&sub).unwrap();
        let mut r = Runner::new(&sub, ScriptedConfirm::default()).with_step_delay(Duration::ZERO);
        r.run_plan(&[step("pwd", "touch here")]);
        assert!(sub.join("here").exists());
    }
}
