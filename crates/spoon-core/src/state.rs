use crate::types::{HistoryKind, Stage};
use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, Deserializer, IgnoredAny};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const DEFAULT_PROGRESS: f64 = 0.45;
pub const DEFAULT_TOKENS: u32 = 100;
pub const DEFAULT_MODEL: &str = "anthropic/claude-3.5-sonnet";

/// Share of every progress delta that also flows into `system_control`.
const CONTROL_FACTOR: f64 = 0.8;

// ---------------------------------------------------------------------------
// Supporting types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub username: String,
    pub auth_token: String,
}

impl Identity {
    pub fn masked_token(&self) -> String {
        mask_secret(&self.auth_token)
    }
}

/// `secret` with everything but the last four characters hidden. Secrets of
/// four characters or fewer are hidden entirely.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageTransition {
    pub from: Stage,
    pub to: Stage,
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct History {
    pub guidance: Vec<HistoryEntry>,
    pub exchanges: Vec<HistoryEntry>,
    pub insights: Vec<HistoryEntry>,
    pub deployments: Vec<HistoryEntry>,
    pub environments: Vec<HistoryEntry>,
    pub harnessed: Vec<HistoryEntry>,
    pub operations: Vec<HistoryEntry>,
    pub projects: Vec<HistoryEntry>,
}

impl History {
    pub fn list(&self, kind: HistoryKind) -> &[HistoryEntry] {
        match kind {
            HistoryKind::Guidance => &self.guidance,
            HistoryKind::Exchanges => &self.exchanges,
            HistoryKind::Insights => &self.insights,
            HistoryKind::Deployments => &self.deployments,
            HistoryKind::Environments => &self.environments,
            HistoryKind::Harnessed => &self.harnessed,
            HistoryKind::Operations => &self.operations,
            HistoryKind::Projects => &self.projects,
        }
    }

    fn list_mut(&mut self, kind: HistoryKind) -> &mut Vec<HistoryEntry> {
        match kind {
            HistoryKind::Guidance => &mut self.guidance,
            HistoryKind::Exchanges => &mut self.exchanges,
            HistoryKind::Insights => &mut self.insights,
            HistoryKind::Deployments => &mut self.deployments,
            HistoryKind::Environments => &mut self.environments,
            HistoryKind::Harnessed => &mut self.harnessed,
            HistoryKind::Operations => &mut self.operations,
            HistoryKind::Projects => &mut self.projects,
        }
    }

    /// Append with FIFO eviction. Kinds that are unique by subject move an
    /// existing entry to the end instead of duplicating it.
    pub fn push(&mut self, kind: HistoryKind, entry: HistoryEntry) {
        let list = self.list_mut(kind);
        if kind.dedup() {
            list.retain(|e| e.subject != entry.subject);
        }
        list.push(entry);
        trim(list, kind.cap());
    }

    fn enforce_caps(&mut self) {
        for &kind in HistoryKind::all() {
            trim(self.list_mut(kind), kind.cap());
        }
    }
}

fn trim(list: &mut Vec<HistoryEntry>, cap: usize) {
    if list.len() > cap {
        list.drain(..list.len() - cap);
    }
}

// ---------------------------------------------------------------------------
// ProgressState
// ---------------------------------------------------------------------------

/// The persisted progress record. Field names are camelCase on disk; keys
/// this version does not know about are carried through `extra` untouched.
///
/// Reading never rejects a well-formed JSON object: a field whose value does
/// not fit its type takes that field's default, and the cached `stage` is
/// ignored in favour of the one derived from `progressValue`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressState {
    #[serde(deserialize_with = "lenient_progress")]
    pub progress_value: f64,
    #[serde(deserialize_with = "derived_stage")]
    pub stage: Stage,
    #[serde(deserialize_with = "lenient")]
    pub command_count: u64,
    #[serde(deserialize_with = "lenient_progress")]
    pub system_control: f64,
    #[serde(deserialize_with = "lenient_tokens")]
    pub token_balance: u32,
    #[serde(deserialize_with = "lenient")]
    pub api_keys: BTreeMap<String, String>,
    #[serde(deserialize_with = "lenient")]
    pub assistant_model: String,
    #[serde(deserialize_with = "lenient")]
    pub identity: Option<Identity>,
    #[serde(deserialize_with = "lenient")]
    pub history: History,
    #[serde(deserialize_with = "lenient")]
    pub last_stage_change: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient")]
    pub last_remote_sync: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "lenient")]
    pub revision: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            progress_value: DEFAULT_PROGRESS,
            stage: Stage::from_progress(DEFAULT_PROGRESS),
            command_count: 0,
            system_control: DEFAULT_PROGRESS,
            token_balance: DEFAULT_TOKENS,
            api_keys: BTreeMap::new(),
            assistant_model: DEFAULT_MODEL.to_string(),
            identity: None,
            history: History::default(),
            last_stage_change: None,
            last_remote_sync: None,
            revision: 0,
            extra: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoding
// ---------------------------------------------------------------------------

fn lenient_or<'de, D, T>(deserializer: D, fallback: fn() -> T) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_else(|_| fallback()))
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    lenient_or(deserializer, T::default)
}

fn lenient_progress<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    lenient_or(deserializer, || DEFAULT_PROGRESS)
}

fn lenient_tokens<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    lenient_or(deserializer, || DEFAULT_TOKENS)
}

/// Accepts any stored value; `normalize` derives the real stage.
fn derived_stage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Stage, D::Error> {
    IgnoredAny::deserialize(deserializer)?;
    Ok(Stage::from_progress(DEFAULT_PROGRESS))
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

impl ProgressState {
    /// Stage derived from the current progress value.
    pub fn current_stage(&self) -> Stage {
        Stage::from_progress(self.progress_value)
    }

    /// Restore invariants after deserializing hand-edited or foreign data.
    pub fn normalize(&mut self) {
        self.progress_value = clamp_unit(self.progress_value);
        self.system_control = clamp_unit(self.system_control);
        self.stage = self.current_stage();
        if self.assistant_model.trim().is_empty() {
            self.assistant_model = DEFAULT_MODEL.to_string();
        }
        self.history.enforce_caps();
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Raise progress by `delta` (negative deltas count as zero). Returns the
    /// stage transition when a threshold was crossed.
    pub fn advance(&mut self, delta: f64, now: DateTime<Utc>) -> Option<StageTransition> {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        let before = self.current_stage();
        self.progress_value = clamp_unit(self.progress_value + delta);
        self.system_control = clamp_unit(self.system_control + delta * CONTROL_FACTOR);
        self.command_count += 1;
        let after = self.current_stage();
        self.stage = after;
        if after != before {
            self.last_stage_change = Some(now);
            Some(StageTransition {
                from: before,
                to: after,
            })
        } else {
            None
        }
    }

    /// Spend one token. Returns false and leaves the balance alone at zero.
    pub fn take_token(&mut self) -> bool {
        if self.token_balance == 0 {
            return false;
        }
        self.token_balance -= 1;
        true
    }

    pub fn add_tokens(&mut self, amount: u32) -> u32 {
        self.token_balance = self.token_balance.saturating_add(amount);
        self.token_balance
    }

    pub fn record(
        &mut self,
        kind: HistoryKind,
        subject: impl Into<String>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.history.push(
            kind,
            HistoryEntry {
                timestamp: now,
                subject: subject.into(),
                note,
            },
        );
    }

    /// Adopt `remote` wholesale, keeping the local credentials (identity and
    /// API keys) and never moving the revision counter backwards.
    pub fn merge_remote(&mut self, mut remote: ProgressState) {
        remote.normalize();
        remote.identity = self.identity.take();
        remote.api_keys = std::mem::take(&mut self.api_keys);
        remote.revision = self.revision.max(remote.revision);
        *self = remote;
    }

    /// Copy fit for upload: credentials are stripped and the stage is current.
    pub fn shareable(&self) -> ProgressState {
        ProgressState {
            identity: None,
            api_keys: BTreeMap::new(),
            stage: self.current_stage(),
            ..self.clone()
        }
    }

    /// Back to defaults, optionally keeping keys, model, and identity.
    pub fn reset(&mut self, keep_credentials: bool) {
        let mut fresh = ProgressState {
            revision: self.revision,
            ..ProgressState::default()
        };
        if keep_credentials {
            fresh.api_keys = std::mem::take(&mut self.api_keys);
            fresh.assistant_model = std::mem::take(&mut self.assistant_model);
            fresh.identity = self.identity.take();
        }
        *self = fresh;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(subject: &str) -> HistoryEntry {
        HistoryEntry {
            timestamp: Utc::now(),
            subject: subject.to_string(),
            note: None,
        }
    }

    #[test]
    fn defaults() {
        let s = ProgressState::default();
        assert_eq!(s.progress_value, 0.45);
        assert_eq!(s.stage, Stage::Mid);
        assert_eq!(s.token_balance, 100);
        assert_eq!(s.assistant_model, DEFAULT_MODEL);
        assert!(s.identity.is_none());
    }

    #[test]
    fn advance_never_exceeds_one() {
        let mut s = ProgressState::default();
        for _ in 0..100 {
            s.advance(0.15, Utc::now());
            assert!(s.progress_value <= 1.0);
            assert!(s.system_control <= 1.0);
        }
        assert_eq!(s.progress_value, 1.0);
        assert_eq!(s.command_count, 100);
    }

    #[test]
    fn advance_ignores_negative_delta() {
        let mut s = ProgressState::default();
        s.advance(-0.5, Utc::now());
        assert_eq!(s.progress_value, 0.45);
        assert_eq!(s.command_count, 1);
    }

    #[test]
    fn advance_reports_transition() {
        let mut s = ProgressState {
            progress_value: 0.68,
            ..ProgressState::default()
        };
        let t = s.advance(0.05, Utc::now()).unwrap();
        assert_eq!(t.from, Stage::Mid);
        assert_eq!(t.to, Stage::Advanced);
        assert_eq!(s.stage, Stage::Advanced);
        assert!(s.last_stage_change.is_some());

        assert!(s.advance(0.05, Utc::now()).is_none());
    }

    #[test]
    fn take_token_at_zero_is_refused() {
        let mut s = ProgressState {
            token_balance: 0,
            ..ProgressState::default()
        };
        let before = s.clone();
        assert!(!s.take_token());
        assert_eq!(s, before);
    }

    #[test]
    fn take_token_decrements() {
        let mut s = ProgressState::default();
        assert!(s.take_token());
        assert_eq!(s.token_balance, 99);
    }

    #[test]
    fn history_evicts_oldest_first() {
        let mut h = History::default();
        for i in 0..25 {
            h.push(HistoryKind::Exchanges, entry(&format!("q{i}")));
        }
        let list = h.list(HistoryKind::Exchanges);
        assert_eq!(list.len(), 20);
        assert_eq!(list.first().unwrap().subject, "q5");
        assert_eq!(list.last().unwrap().subject, "q24");
    }

    #[test]
    fn harnessed_is_unique_by_subject() {
        let mut h = History::default();
        h.push(HistoryKind::Harnessed, entry("docker"));
        h.push(HistoryKind::Harnessed, entry("git"));
        h.push(HistoryKind::Harnessed, entry("docker"));
        let subjects: Vec<_> = h
            .list(HistoryKind::Harnessed)
            .iter()
            .map(|e| e.subject.as_str())
            .collect();
        assert_eq!(subjects, vec!["git", "docker"]);
    }

    #[test]
    fn missing_fields_are_backfilled() {
        let s: ProgressState = serde_json::from_str(r#"{"progressValue": 0.9}"#).unwrap();
        assert_eq!(s.progress_value, 0.9);
        assert_eq!(s.token_balance, 100);
        assert_eq!(s.assistant_model, DEFAULT_MODEL);
    }

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let json = r#"{"progressValue": 0.5, "matrixGlitches": [1, 2], "theme": "green"}"#;
        let s: ProgressState = serde_json::from_str(json).unwrap();
        assert_eq!(s.extra.get("theme"), Some(&Value::from("green")));
        let out = serde_json::to_string(&s).unwrap();
        assert!(out.contains("\"matrixGlitches\":[1,2]"));
    }

    #[test]
    fn normalize_clamps_and_truncates() {
        let mut s = ProgressState {
            progress_value: 3.0,
            system_control: -1.0,
            stage: Stage::Early,
            ..ProgressState::default()
        };
        for i in 0..30 {
            s.history.guidance.push(entry(&format!("g{i}")));
        }
        s.normalize();
        assert_eq!(s.progress_value, 1.0);
        assert_eq!(s.system_control, 0.0);
        assert_eq!(s.stage, Stage::Advanced);
        assert_eq!(s.history.guidance.len(), 10);
        assert_eq!(s.history.guidance[0].subject, "g20");
    }

    #[test]
    fn merge_remote_keeps_local_identity() {
        let mut local = ProgressState {
            identity: Some(Identity {
                username: "neo".into(),
                auth_token: "local-token".into(),
            }),
            revision: 7,
            ..ProgressState::default()
        };
        let remote = ProgressState {
            progress_value: 0.8,
            identity: Some(Identity {
                username: "smith".into(),
                auth_token: "remote-token".into(),
            }),
            revision: 3,
            ..ProgressState::default()
        };
        local.api_keys.insert("openrouter".into(), "sk-local".into());
        local.merge_remote(remote);
        assert_eq!(local.progress_value, 0.8);
        assert_eq!(local.api_keys.get("openrouter").unwrap(), "sk-local");
        assert_eq!(local.stage, Stage::Advanced);
        assert_eq!(local.identity.as_ref().unwrap().username, "neo");
        assert_eq!(local.revision, 7);
    }

    #[test]
    fn reset_can_keep_credentials() {
        let mut s = ProgressState::default();
        s.api_keys.insert("openrouter".into(), "sk-1".into());
        s.advance(0.3, Utc::now());
        s.reset(true);
        assert_eq!(s.progress_value, DEFAULT_PROGRESS);
        assert_eq!(s.command_count, 0);
        assert_eq!(s.api_keys.get("openrouter").unwrap(), "sk-1");

        s.reset(false);
        assert!(s.api_keys.is_empty());
    }

    #[test]
    fn masked_token_shows_last_four() {
        let id = Identity {
            username: "neo".into(),
            auth_token: "ghp_abcdef1234".into(),
        };
        assert_eq!(id.masked_token(), "****1234");
        let short = Identity {
            username: "neo".into(),
            auth_token: "ab".into(),
        };
        assert_eq!(short.masked_token(), "****");
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret("abcde"), "****bcde");
    }

    #[test]
    fn unknown_stage_is_recomputed() {
        let s: ProgressState = serde_json::from_str(
            r#"{"progressValue": 0.9, "stage": "the_one", "commandCount": 42}"#,
        )
        .unwrap();
        assert_eq!(s.command_count, 42);
        assert!(!s.extra.contains_key("stage"));
        let mut s = s;
        s.normalize();
        assert_eq!(s.stage, Stage::Advanced);

        let display: ProgressState =
            serde_json::from_str(r#"{"progressValue": 0.1, "stage": "Early Access"}"#).unwrap();
        assert_eq!(display.progress_value, 0.1);
    }

    #[test]
    fn ill_typed_fields_take_their_defaults() {
        let s: ProgressState = serde_json::from_str(
            r#"{"progressValue": "high", "commandCount": 5, "tokenBalance": -1,
                "revision": 3.5, "identity": 12, "lastRemoteSync": "yesterday"}"#,
        )
        .unwrap();
        assert_eq!(s.progress_value, DEFAULT_PROGRESS);
        assert_eq!(s.command_count, 5);
        assert_eq!(s.token_balance, DEFAULT_TOKENS);
        assert_eq!(s.revision, 0);
        assert!(s.identity.is_none());
        assert!(s.last_remote_sync.is_none());
    }

    #[test]
    fn shareable_copy_has_no_credentials() {
        let mut s = ProgressState {
            identity: Some(Identity {
                username: "neo".into(),
                auth_token: "ghp_secret".into(),
            }),
            ..ProgressState::default()
        };
        s.api_keys.insert("openai".into(), "sk-secret".into());
        let shared = s.shareable();
        assert!(shared.identity.is_none());
        assert!(shared.api_keys.is_empty());
        assert_eq!(shared.history, s.history);
        assert!(s.identity.is_some());
    }
}
