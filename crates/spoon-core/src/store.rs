//! Load-once, persist-on-every-mutation wrapper around [`ProgressState`].
//!
//! No method here returns an I/O error. A state file that cannot be read
//! yields defaults, and a write that fails is logged and skipped, so the
//! command the user asked for still runs.

use crate::error::Result;
use crate::io::{self, LockGuard};
use crate::paths;
use crate::state::{Identity, ProgressState, StageTransition};
use crate::types::{ActionKind, HistoryKind};
use chrono::Utc;
use std::path::{Path, PathBuf};

/// Receives a snapshot of the state after each successful persist when an
/// identity is configured. Implementations must not block the caller.
pub trait BackgroundSync {
    fn schedule(&self, identity: &Identity, snapshot: String);
}

type StageObserver = Box<dyn FnMut(StageTransition)>;

pub struct ProgressStore {
    path: PathBuf,
    state: ProgressState,
    /// Revision last read from or written to disk.
    disk_revision: u64,
    observer: Option<StageObserver>,
    sync: Option<Box<dyn BackgroundSync>>,
}

impl std::fmt::Debug for ProgressStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStore")
            .field("path", &self.path)
            .field("state", &self.state)
            .field("disk_revision", &self.disk_revision)
            .finish_non_exhaustive()
    }
}

enum Loaded {
    Missing,
    Parsed(ProgressState),
}

fn read_state(path: &Path) -> Result<Loaded> {
    let Some(data) = io::read_optional(path)? else {
        return Ok(Loaded::Missing);
    };
    let mut state: ProgressState = serde_json::from_str(&data)?;
    state.normalize();
    Ok(Loaded::Parsed(state))
}

fn render(state: &ProgressState) -> String {
    match serde_json::to_string_pretty(state) {
        Ok(mut s) => {
            s.push('\n');
            s
        }
        // Only non-string map keys can fail here, and there are none.
        Err(_) => String::from("{}\n"),
    }
}

fn read_disk_revision(path: &Path) -> Option<u64> {
    let data = io::read_optional(path).ok()??;
    let value: serde_json::Value = serde_json::from_str(&data).ok()?;
    value.get("revision")?.as_u64()
}

impl ProgressStore {
    /// Load the state at `path`, falling back to defaults when the file is
    /// absent, unreadable, or corrupt. A corrupt file is copied aside first.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let state = match read_state(&path) {
            Ok(Loaded::Parsed(state)) => state,
            Ok(Loaded::Missing) => ProgressState::default(),
            Err(crate::SpoonError::Json(e)) => {
                let backup = paths::corrupt_path(&path);
                tracing::warn!(
                    path = %path.display(),
                    backup = %backup.display(),
                    "state file is not valid JSON ({e}); starting from defaults"
                );
                if let Err(e) = std::fs::copy(&path, &backup) {
                    tracing::warn!("could not back up corrupt state file: {e}");
                }
                ProgressState::default()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "could not read state file: {e}");
                ProgressState::default()
            }
        };
        let disk_revision = state.revision;
        Self {
            path,
            state,
            disk_revision,
            observer: None,
            sync: None,
        }
    }

    /// Open the state file named `file_name` under `root`.
    pub fn open_in(root: &Path, file_name: &str) -> Self {
        Self::open(paths::state_path(root, file_name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Register the callback invoked whenever `advance` crosses a stage.
    pub fn on_stage_change(&mut self, observer: impl FnMut(StageTransition) + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn set_background_sync(&mut self, sync: Box<dyn BackgroundSync>) {
        self.sync = Some(sync);
    }

    /// Serialized form of the state as written to disk.
    pub fn snapshot(&self) -> String {
        let mut state = self.state.clone();
        state.stage = state.current_stage();
        render(&state)
    }

    /// Serialized form for the remote copy. The identity and API keys stay
    /// local.
    pub fn shareable_snapshot(&self) -> String {
        render(&self.state.shareable())
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Write the current state without bumping its revision. Returns whether
    /// the write reached disk.
    pub fn save(&mut self) -> bool {
        match self.write() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "failed to persist state: {e}");
                false
            }
        }
    }

    fn write(&mut self) -> Result<()> {
        let _guard = LockGuard::acquire(&paths::lock_path(&self.path))?;
        if let Some(on_disk) = read_disk_revision(&self.path) {
            if on_disk > self.disk_revision {
                tracing::warn!(
                    on_disk,
                    loaded = self.disk_revision,
                    "state file was changed by another invocation; overwriting"
                );
                self.state.revision = self.state.revision.max(on_disk + 1);
            }
        }
        self.state.stage = self.state.current_stage();
        io::atomic_write(&self.path, self.snapshot().as_bytes())?;
        self.disk_revision = self.state.revision;
        Ok(())
    }

    /// Persist a mutation: bump the revision, write, then hand a snapshot to
    /// the background sync if there is an identity to sync under.
    fn commit(&mut self) {
        self.state.revision += 1;
        if !self.save() {
            return;
        }
        if let (Some(sync), Some(identity)) = (&self.sync, &self.state.identity) {
            sync.schedule(identity, self.shareable_snapshot());
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Raise progress by `delta`, clamped at 1. Returns the new value.
    pub fn advance(&mut self, delta: f64) -> f64 {
        let transition = self.state.advance(delta, Utc::now());
        if let Some(t) = transition {
            tracing::info!(from = %t.from, to = %t.to, "stage transition");
            if let Some(observer) = self.observer.as_mut() {
                observer(t);
            }
        }
        self.commit();
        self.state.progress_value
    }

    pub fn advance_for(&mut self, kind: ActionKind) -> f64 {
        self.advance(kind.delta())
    }

    /// Spend one token. Returns false, without touching the file, at zero.
    pub fn consume_token(&mut self) -> bool {
        if !self.state.take_token() {
            return false;
        }
        self.commit();
        true
    }

    pub fn add_tokens(&mut self, amount: u32) -> u32 {
        let balance = self.state.add_tokens(amount);
        self.commit();
        balance
    }

    pub fn record(&mut self, kind: HistoryKind, subject: &str, note: Option<&str>) {
        self.state
            .record(kind, subject, note.map(str::to_string), Utc::now());
        self.commit();
    }

    pub fn set_api_key(&mut self, provider: &str, key: &str) {
        self.state
            .api_keys
            .insert(provider.to_ascii_lowercase(), key.to_string());
        self.commit();
    }

    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self
            .state
            .api_keys
            .remove(&provider.to_ascii_lowercase())
            .is_some();
        if removed {
            self.commit();
        }
        removed
    }

    pub fn set_model(&mut self, model: &str) {
        self.state.assistant_model = model.to_string();
        self.commit();
    }

    pub fn set_identity(&mut self, identity: Identity) {
        self.state.identity = Some(identity);
        self.commit();
    }

    pub fn clear_identity(&mut self) -> bool {
        let had = self.state.identity.take().is_some();
        if had {
            self.commit();
        }
        had
    }

    pub fn mark_synced(&mut self) {
        self.state.last_remote_sync = Some(Utc::now());
        self.commit();
    }

    /// Replace local state with a remote blob, keeping the local identity.
    pub fn merge_remote(&mut self, blob: &str) -> Result<()> {
        let remote: ProgressState = serde_json::from_str(blob)?;
        self.state.merge_remote(remote);
        self.commit();
        Ok(())
    }

    pub fn reset(&mut self, keep_credentials: bool) {
        self.state.reset(keep_credentials);
        self.commit();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
