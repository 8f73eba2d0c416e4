//! Yes/no confirmation sources for the runner.

use std::collections::VecDeque;
use std::io::{BufRead, Write};

pub trait Confirm {
    /// Ask `question`; true means proceed.
    fn confirm(&mut self, question: &str) -> bool;
}

/// Reads the answer from stdin. Only `y` / `yes` count as yes; EOF and read
/// errors count as no, so a detached terminal never blocks a plan forever.
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        eprint!("{question} (y/N) ");
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        match std::io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => {
                eprintln!();
                false
            }
            Ok(_) => is_yes(&line),
        }
    }
}

pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Answers every question with no (`--no-input`).
#[derive(Debug, Default)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!("auto-declined: {question}");
        false
    }
}

/// Answers every question with yes (`--yes`).
#[derive(Debug, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, question: &str) -> bool {
        tracing::debug!("auto-accepted: {question}");
        true
    }
}

/// Replays scripted answers and records the questions asked. Once the
/// script runs out every answer is no.
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

impl<C: Confirm + ?Sized> Confirm for &mut C {
    fn confirm(&mut self, question: &str) -> bool {
        (**self).confirm(question)
    }
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
    fn confirm(&mut self, question: &str) -> bool {
        (**self).confirm(question)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes("  YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("n"));
        assert!(!is_yes("yep"));
    }

    #[test]
    fn scripted_records_and_defaults_to_no() {
        let mut c = ScriptedConfirm::new([true]);
        assert!(c.confirm("first?"));
        assert!(!c.confirm("second?"));
        assert_eq!(c.asked, vec!["first?", "second?"]);
    }
}
