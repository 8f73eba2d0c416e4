//! Detached gist upload after each persisted mutation.
//!
//! Snapshots coalesce: only the newest one waiting is uploaded, by a single
//! worker thread. At exit [`GistSync::drain`] waits up to the configured
//! grace period and then abandons whatever is still in flight.

use spoon_core::state::Identity;
use spoon_core::store::BackgroundSync;
use spoon_relay::GistClient;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

struct Job {
    identity: Identity,
    snapshot: String,
}

#[derive(Default)]
struct Shared {
    latest: Mutex<Option<Job>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Clone)]
pub struct GistSync {
    api: String,
    timeout: Duration,
    shared: Arc<Shared>,
}

impl GistSync {
    pub fn new(api: &str, timeout: Duration) -> Self {
        Self {
            api: api.to_string(),
            timeout,
            shared: Arc::new(Shared::default()),
        }
    }

    fn has_work(&self) -> bool {
        self.shared
            .latest
            .lock()
            .map(|job| job.is_some())
            .unwrap_or(false)
    }

    fn worker_busy(&self) -> bool {
        self.shared
            .worker
            .lock()
            .map(|w| w.as_ref().map(|h| !h.is_finished()).unwrap_or(false))
            .unwrap_or(false)
    }

    fn ensure_worker(&self) {
        let Ok(mut worker) = self.shared.worker.lock() else {
            return;
        };
        if worker.as_ref().map(|h| !h.is_finished()).unwrap_or(false) {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let api = self.api.clone();
        let timeout = self.timeout;
        *worker = Some(std::thread::spawn(move || loop {
            let job = match shared.latest.lock() {
                Ok(mut latest) => latest.take(),
                Err(_) => None,
            };
            let Some(job) = job else { break };
            upload(&api, timeout, &job);
        }));
    }

    /// Wait for pending uploads, at most `grace`.
    pub fn drain(&self, grace: Duration) {
        let deadline = Instant::now() + grace;
        loop {
            if !self.worker_busy() {
                if !self.has_work() {
                    return;
                }
                self.ensure_worker();
            }
            if Instant::now() >= deadline {
                tracing::debug!("background sync still running at exit; abandoning it");
                return;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
    }
}

impl BackgroundSync for GistSync {
    fn schedule(&self, identity: &Identity, snapshot: String) {
        if let Ok(mut latest) = self.shared.latest.lock() {
            *latest = Some(Job {
                identity: identity.clone(),
                snapshot,
            });
        }
        self.ensure_worker();
    }
}

fn upload(api: &str, timeout: Duration, job: &Job) {
    let result = GistClient::new(
        api,
        &job.identity.username,
        &job.identity.auth_token,
        timeout,
    )
    .and_then(|client| client.push(&job.snapshot));
    match result {
        Ok(id) => tracing::debug!(gist = %id, "background sync uploaded"),
        Err(e) => tracing::debug!("background sync failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_without_work_returns_immediately() {
        let sync = GistSync::new("http://127.0.0.1:9", Duration::from_millis(100));
        let start = Instant::now();
        sync.drain(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn failed_upload_is_swallowed_within_grace() {
        let sync = GistSync::new("http://127.0.0.1:9", Duration::from_millis(200));
        let identity = Identity {
            username: "neo".into(),
            auth_token: "t".into(),
        };
        sync.schedule(&identity, "{}".into());
        sync.schedule(&identity, "{\"revision\": 2}".into());
        let start = Instant::now();
        sync.drain(Duration::from_secs(3));
        assert!(start.elapsed() < Duration::from_secs(4));
        assert!(!sync.has_work());
    }
}
