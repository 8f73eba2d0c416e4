use crate::background::GistSync;
use spoon_core::config::Config;
use spoon_core::prompt::{AssumeNo, AssumeYes, Confirm, StdinConfirm};
use spoon_core::router::CommandTranslator;
use spoon_core::runner::Runner;
use spoon_core::state::{Identity, ProgressState};
use spoon_core::store::ProgressStore;
use spoon_core::SpoonError;
use spoon_relay::{ChatClient, GistClient, RelayError};
use std::path::PathBuf;

/// Everything a command needs besides its own arguments.
pub struct Ctx {
    pub root: PathBuf,
    pub config: Config,
    pub json: bool,
    pub no_input: bool,
    pub yes: bool,
    sync: GistSync,
}

impl Ctx {
    pub fn new(root: PathBuf, config: Config, json: bool, no_input: bool, yes: bool) -> Self {
        let sync = GistSync::new(&config.relay.github_api, config.relay.timeout());
        Self {
            root,
            config,
            json,
            no_input,
            yes,
            sync,
        }
    }

    /// Open the state file with the stage observer attached and, when
    /// enabled, background sync after each mutation.
    pub fn open_store(&self) -> ProgressStore {
        let mut store = self.open_store_without_sync();
        if self.config.relay.auto_sync {
            store.set_background_sync(Box::new(self.sync.clone()));
        }
        store
    }

    /// For commands that talk to the gist themselves.
    pub fn open_store_without_sync(&self) -> ProgressStore {
        let mut store = ProgressStore::open_in(&self.root, &self.config.state_file);
        store.on_stage_change(|t| eprintln!("stage: {} → {}", t.from, t.to));
        store
    }

    /// `--yes` wins over `--no-input`; a config `assume_no` acts like
    /// `--no-input`.
    pub fn confirm(&self) -> Box<dyn Confirm> {
        if self.yes {
            Box::new(AssumeYes)
        } else if self.no_input || self.config.runner.assume_no {
            Box::new(AssumeNo)
        } else {
            Box::new(StdinConfirm)
        }
    }

    /// Steps run in the invocation directory, not the state root.
    pub fn runner(&self) -> Runner<Box<dyn Confirm>> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| self.root.clone());
        Runner::new(cwd, self.confirm()).with_step_delay(self.config.runner.step_delay())
    }

    pub fn chat_client(&self, state: &ProgressState) -> Result<ChatClient, RelayError> {
        let relay = &self.config.relay;
        let client = ChatClient::from_keys(&state.api_keys, &state.assistant_model, relay.timeout())?
            .with_max_tokens(relay.max_tokens);
        Ok(match &relay.chat_endpoint {
            Some(endpoint) => client.with_endpoint(endpoint.clone()),
            None => client,
        })
    }

    pub fn gist_client(&self, identity: &Identity) -> Result<GistClient, RelayError> {
        GistClient::new(
            &self.config.relay.github_api,
            &identity.username,
            &identity.auth_token,
            self.config.relay.timeout(),
        )
    }

    /// Give background syncs their grace period before the process exits.
    pub fn finish(&self) {
        self.sync.drain(self.config.relay.sync_grace());
    }
}

/// Chat-backed natural-language → shell translation for the router.
pub struct RelayTranslator(pub ChatClient);

impl CommandTranslator for RelayTranslator {
    fn translate(&self, request: &str) -> spoon_core::Result<String> {
        self.0
            .translate_to_shell_command(request)
            .map_err(|e| SpoonError::Translation(e.to_string()))
    }
}
