//! Blocking HTTP collaborators for the `spoon` CLI.
//!
//! Two remote services sit behind this crate: an OpenAI-compatible
//! chat-completions endpoint (command translation and conversation) and the
//! GitHub gist API (progress state sync). Both use `reqwest::blocking`; the
//! CLI has no async runtime.
//!
//! # Architecture
//!
//! ```text
//! ChatClient  ── POST {model, max_tokens, messages} ──▶ openrouter.ai / api.openai.com
//!     │              bearer credential from the state file
//!     ▼
//! choices[0].message.content → code fences stripped → shell command
//!
//! GistClient  ── GET /gists ──▶ find "[SPOON-AUTO-SYNC] <user>"
//!     │          PATCH /gists/{id} or POST /gists
//!     ▼
//! files["spoon-state.json"].content  ⇄  ProgressStore snapshot
//! ```

pub mod chat;
pub mod error;
pub mod gist;
pub mod types;

#[cfg(test)]
mod tests;

pub use chat::{clean_command, ChatClient, Provider};
pub use error::RelayError;
pub use gist::GistClient;

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Map a non-success response to the matching error; pass success through.
pub(crate) fn check(response: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(RelayError::InvalidCredential);
    }
    let body = response.text().unwrap_or_default();
    Err(RelayError::Http {
        status: status.as_u16(),
        body: truncate(&body, 512),
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &s[..end])
}
