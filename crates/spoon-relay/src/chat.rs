use crate::error::RelayError;
use crate::types::{ChatMessage, ChatRequest, ChatResponse};
use crate::{check, Result};
use std::collections::BTreeMap;
use std::time::Duration;

pub const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Used with OpenAI when the configured model is an OpenRouter-style
/// `vendor/model` id.
pub const OPENAI_FALLBACK_MODEL: &str = "gpt-4o-mini";

pub const TRANSLATE_PROMPT: &str = "You are a Linux shell expert. Translate the user's request \
into a single precise shell command. Reply with the command only: no markdown, no explanation.";

pub const DEFAULT_MAX_TOKENS: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenRouter,
    OpenAi,
}

impl Provider {
    /// Preference order when several keys are stored.
    pub const ALL: [Provider; 2] = [Provider::OpenRouter, Provider::OpenAi];

    pub fn key_name(self) -> &'static str {
        match self {
            Provider::OpenRouter => "openrouter",
            Provider::OpenAi => "openai",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Provider::OpenRouter => OPENROUTER_URL,
            Provider::OpenAi => OPENAI_URL,
        }
    }

    /// First provider with a non-empty key in `keys`.
    pub fn select(keys: &BTreeMap<String, String>) -> Option<(Provider, &str)> {
        Provider::ALL.into_iter().find_map(|p| {
            keys.get(p.key_name())
                .map(String::as_str)
                .filter(|k| !k.trim().is_empty())
                .map(|k| (p, k))
        })
    }

    fn model_for(self, requested: &str) -> String {
        match self {
            Provider::OpenAi if requested.contains('/') => OPENAI_FALLBACK_MODEL.to_string(),
            _ => requested.to_string(),
        }
    }
}

/// Strip markdown code fences and stray backticks from a model reply.
pub fn clean_command(reply: &str) -> String {
    let trimmed = reply.trim();
    let body = if trimmed.starts_with("```") {
        let mut lines: Vec<&str> = trimmed.lines().skip(1).collect();
        if lines.last().map(|l| l.trim() == "```").unwrap_or(false) {
            lines.pop();
        }
        lines.join("\n")
    } else {
        trimmed.to_string()
    };
    body.trim().trim_matches('`').trim().to_string()
}

// ─── ChatClient ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::blocking::Client,
    provider: Provider,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

impl ChatClient {
    pub fn new(provider: Provider, api_key: &str, model: &str, timeout: Duration) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RelayError::MissingCredential(provider.key_name().to_string()));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            provider,
            endpoint: provider.endpoint().to_string(),
            api_key: api_key.to_string(),
            model: provider.model_for(model),
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Build a client from the stored key map, preferring OpenRouter.
    pub fn from_keys(
        keys: &BTreeMap<String, String>,
        model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let (provider, key) = Provider::select(keys)
            .ok_or_else(|| RelayError::MissingCredential("openrouter".to_string()))?;
        Self::new(provider, key, model, timeout)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Reply budget for `translate_to_shell_command`.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One system + user exchange; returns the trimmed reply text.
    pub fn complete(&self, system: &str, user: &str, max_tokens: u32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            max_tokens,
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        };
        tracing::debug!(endpoint = %self.endpoint, model = %self.model, "chat completion");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("X-Title", "spoon")
            .json(&body)
            .send()?;
        let parsed: ChatResponse = check(response)?.json()?;

        parsed
            .first_content()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| RelayError::InvalidResponse("no choices[0].message.content".into()))
    }

    pub fn translate_to_shell_command(&self, request: &str) -> Result<String> {
        let reply = self.complete(TRANSLATE_PROMPT, request, self.max_tokens)?;
        let command = clean_command(&reply);
        if command.is_empty() {
            return Err(RelayError::InvalidResponse(
                "reply contained no command".into(),
            ));
        }
        Ok(command)
    }
}
