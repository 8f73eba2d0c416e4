//! Project-name extraction from free text.

use regex::Regex;
use std::sync::OnceLock;

pub const FALLBACK_TARGET: &str = "matrix-project";

/// Words the token fallback never picks as a name.
const STOPWORDS: &[&str] = &[
    "create", "make", "build", "deploy", "setup", "with", "and", "python", "ai", "env",
];

/// Captures that are part of the command grammar rather than a name.
const GRAMMAR_WORDS: &[&str] = &[
    "app", "project", "website", "site", "env", "environment", "model", "called", "named",
    "name", "with", "and", "for", "the",
];

static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn patterns() -> &'static [Regex] {
    PATTERNS.get_or_init(|| {
        [
            r#"(?i)\b(?:create|make|build)\s+(?:an?\s+)?(?:app|project|website|site|env|environment|ai|model)\s+(?:called\s+|named\s+)?["']?([A-Za-z0-9_-]+)"#,
            r#"(?i)\b(?:called|named|name)\s+["']?([A-Za-z0-9_-]+)"#,
            r#"["']([A-Za-z0-9_-]+)["']"#,
            r#"(?i)\b(?:for|with)\s+["']?([A-Za-z0-9_-]+)"#,
            r#"(?i)\b(?:app|project|website|env|environment|ai|model)\s+["']?([A-Za-z0-9_-]+)"#,
            r"(?i)\bcreate\s+[a-z-]+\s+([A-Za-z0-9_-]+)",
            r"(?i)\b(?:create|make|build)\s+(?:a\s+)?[\w-]+\s+([A-Za-z0-9_-]+)(?:\s|$)",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    })
}

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap())
}

/// A leading `-` would reach the scaffolding tools as an option.
fn acceptable(candidate: &str) -> bool {
    candidate.len() > 1
        && !candidate.starts_with('-')
        && !GRAMMAR_WORDS.contains(&candidate.to_ascii_lowercase().as_str())
}

/// Pull a project name out of `text`.
///
/// Patterns are tried in order and the first acceptable capture wins. After
/// that the first plausible bare token is used, and finally a fixed default.
/// The result keeps the user's casing, only contains `[A-Za-z0-9_-]` and never
/// starts with `-`.
pub fn extract_target(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return FALLBACK_TARGET.to_string();
    }

    for re in patterns() {
        if let Some(m) = re.captures(text).and_then(|c| c.get(1)) {
            if acceptable(m.as_str()) {
                return m.as_str().to_string();
            }
        }
    }

    text.split_whitespace()
        .find(|tok| {
            tok.len() > 3
                && token_re().is_match(tok)
                && acceptable(tok)
                && !STOPWORDS.contains(&tok.to_ascii_lowercase().as_str())
        })
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_TARGET.to_string())
}
