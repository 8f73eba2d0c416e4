use crate::rules::default_rules;
use crate::target::{extract_target, FALLBACK_TARGET};
use crate::types::{Backend, DeployTarget, Frontend, PythonKind, Tool, ToolAction};
use serde::Serialize;
use std::fmt;

// ---------------------------------------------------------------------------
// EvalContext
// ---------------------------------------------------------------------------

/// Input text prepared once for all rule conditions.
pub struct EvalContext<'a> {
    pub text: &'a str,
    pub lower: String,
    words: Vec<String>,
}

impl<'a> EvalContext<'a> {
    pub fn new(text: &'a str) -> Self {
        let lower = text.trim().to_lowercase();
        let words = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        Self { text, lower, words }
    }

    /// Keywords of three characters or fewer must appear as a whole word, so
    /// "ai" does not fire on "email". Longer keywords match anywhere.
    pub fn mentions(&self, keyword: &str) -> bool {
        if keyword.len() <= 3 && !keyword.contains(' ') {
            self.words.iter().any(|w| w == keyword)
        } else {
            self.lower.contains(keyword)
        }
    }

    pub fn mentions_any(&self, keywords: &[&str]) -> bool {
        keywords.iter().any(|k| self.mentions(k))
    }

    pub fn first_word(&self) -> Option<&str> {
        self.words.first().map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Category / Intent (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "category", rename_all = "kebab-case")]
pub enum Category {
    Question,
    FullStack { frontend: Frontend, backend: Backend },
    PythonAi { kind: PythonKind },
    SystemCommand,
    HtmlSite,
    ReactCreate,
    Deploy { provider: DeployTarget },
    Tool { tool: Tool, action: ToolAction },
    General,
}

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Question => "question",
            Category::FullStack { .. } => "full-stack",
            Category::PythonAi { .. } => "python-ai",
            Category::SystemCommand => "system-command",
            Category::HtmlSite => "html-site",
            Category::ReactCreate => "react-create",
            Category::Deploy { .. } => "deploy",
            Category::Tool { .. } => "tool",
            Category::General => "general",
        }
    }

    /// Human-readable detail, e.g. "react + node" for a full-stack intent.
    pub fn detail(&self) -> Option<String> {
        match self {
            Category::FullStack { frontend, backend } => Some(format!("{frontend} + {backend}")),
            Category::PythonAi { kind } => Some(kind.to_string()),
            Category::Deploy { provider } => Some(provider.to_string()),
            Category::Tool { tool, action } => Some(format!("{tool} {action}")),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.detail() {
            Some(d) => write!(f, "{} ({d})", self.name()),
            None => f.write_str(self.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Intent {
    #[serde(flatten)]
    pub category: Category,
    pub target: String,
    pub text: String,
    /// Id of the rule that matched; `None` for the fallback.
    pub rule: Option<&'static str>,
}

impl Intent {
    pub fn new(category: Category, target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category,
            target: target.into(),
            text: text.into(),
            rule: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A fn-pointer rule: no allocation, evaluated in list order.
pub struct Rule {
    pub id: &'static str,
    pub condition: fn(&EvalContext) -> bool,
    pub category: fn(&EvalContext) -> Category,
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier {
    rules: Vec<Rule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl Classifier {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// First matching rule wins; no match is `General`.
    pub fn classify(&self, text: &str) -> Intent {
        if text.trim().is_empty() {
            return Intent::new(Category::General, FALLBACK_TARGET, text);
        }
        let ctx = EvalContext::new(text);
        let target = extract_target(text);
        for rule in &self.rules {
            if (rule.condition)(&ctx) {
                return Intent {
                    category: (rule.category)(&ctx),
                    target,
                    text: text.to_string(),
                    rule: Some(rule.id),
                };
            }
        }
        Intent::new(Category::General, target, text)
    }
}

/// Classify with the default rule order.
pub fn classify(text: &str) -> Intent {
    Classifier::default().classify(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keywords_match_whole_words_only() {
        let ctx = EvalContext::new("send an email about the api");
        assert!(!ctx.mentions("ai"));
        assert!(ctx.mentions("api"));
        assert!(ctx.mentions("email about"));
    }

    #[test]
    fn first_word_ignores_punctuation() {
        let ctx = EvalContext::new("  How, exactly? ");
        assert_eq!(ctx.first_word(), Some("how"));
    }

    #[test]
    fn custom_rules_replace_defaults() {
        let classifier = Classifier::new(vec![Rule {
            id: "everything-is-html",
            condition: |_| true,
            category: |_| Category::HtmlSite,
        }]);
        let intent = classifier.classify("deploy to aws");
        assert_eq!(intent.category, Category::HtmlSite);
        assert_eq!(intent.rule, Some("everything-is-html"));
    }

    #[test]
    fn no_rules_falls_back_to_general() {
        let intent = Classifier::new(Vec::new()).classify("create react app called foo");
        assert_eq!(intent.category, Category::General);
        assert_eq!(intent.target, "foo");
        assert!(intent.rule.is_none());
    }

    #[test]
    fn intent_serializes_flat() {
        let intent = Intent::new(
            Category::Deploy {
                provider: DeployTarget::Docker,
            },
            "shop",
            "deploy shop to docker",
        );
        let v = serde_json::to_value(&intent).unwrap();
        assert_eq!(v["category"], "deploy");
        assert_eq!(v["provider"], "docker");
        assert_eq!(v["target"], "shop");
    }

    #[test]
    fn display_includes_detail() {
        let c = Category::FullStack {
            frontend: Frontend::Next,
            backend: Backend::Python,
        };
        assert_eq!(c.to_string(), "full-stack (next + python)");
        assert_eq!(Category::General.to_string(), "general");
    }
}
