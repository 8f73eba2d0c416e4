//! Progress state sync through a private GitHub gist.
//!
//! The gist is found by its description, `[SPOON-AUTO-SYNC] <username>`, and
//! carries a single file holding the serialized state.

use crate::error::RelayError;
use crate::types::{Gist, GistContent, GistWrite, GitHubUser};
use crate::{check, Result};
use reqwest::Method;
use std::collections::BTreeMap;
use std::time::Duration;

pub const DEFAULT_API: &str = "https://api.github.com";
pub const SYNC_TAG: &str = "[SPOON-AUTO-SYNC]";
pub const STATE_FILE_NAME: &str = "spoon-state.json";

#[derive(Debug, Clone)]
pub struct GistClient {
    http: reqwest::blocking::Client,
    base: String,
    username: String,
    token: String,
}

impl GistClient {
    pub fn new(base: &str, username: &str, token: &str, timeout: Duration) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(RelayError::MissingCredential("github".to_string()));
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("spoon-cli")
            .build()?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            username: username.to_string(),
            token: token.to_string(),
        })
    }

    pub fn description(&self) -> String {
        format!("{SYNC_TAG} {}", self.username)
    }

    fn request(&self, method: Method, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
    }

    /// The sync gist owned by this user, if one exists.
    pub fn find(&self) -> Result<Option<Gist>> {
        let response = self.request(Method::GET, "/gists").send()?;
        let gists: Vec<Gist> = check(response)?.json()?;
        let description = self.description();
        Ok(gists
            .into_iter()
            .find(|g| g.description.as_deref() == Some(description.as_str())))
    }

    /// Upload `content`, updating the existing gist or creating one. Returns
    /// the gist id.
    pub fn push(&self, content: &str) -> Result<String> {
        let description = self.description();
        let mut files = BTreeMap::new();
        files.insert(STATE_FILE_NAME, GistContent { content });
        let body = GistWrite {
            description: &description,
            public: false,
            files,
        };

        let response = match self.find()? {
            Some(gist) => {
                tracing::debug!(id = %gist.id, "updating sync gist");
                self.request(Method::PATCH, &format!("/gists/{}", gist.id))
                    .json(&body)
                    .send()?
            }
            None => {
                tracing::debug!("creating sync gist");
                self.request(Method::POST, "/gists").json(&body).send()?
            }
        };
        let gist: Gist = check(response)?.json()?;
        Ok(gist.id)
    }

    /// Content of the state file in the sync gist; `None` when there is no
    /// gist or it lacks the file.
    pub fn pull(&self) -> Result<Option<String>> {
        let Some(summary) = self.find()? else {
            return Ok(None);
        };
        let response = self
            .request(Method::GET, &format!("/gists/{}", summary.id))
            .send()?;
        let gist: Gist = check(response)?.json()?;
        Ok(gist
            .files
            .get(STATE_FILE_NAME)
            .and_then(|f| f.content.clone()))
    }

    /// True when the token belongs to `username` (case-insensitive).
    pub fn verify_user(&self) -> Result<bool> {
        let response = self.request(Method::GET, "/user").send()?;
        let user: GitHubUser = check(response)?.json()?;
        Ok(user.login.eq_ignore_ascii_case(&self.username))
    }
}
