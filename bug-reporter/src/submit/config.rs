use secrecy::SecretString;
use std::time::Duration;

pub const DEFAULT_GITHUB_API: &str = "https://api.github.com";

/// Where a JSON relay expects new issues to be posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayPath {
    /// `POST {base}/issue/new-bug`, owner and repo travel in the body.
    #[default]
    NewBug,
    /// `POST {base}/issue/{owner}/{repo}`, owner and repo are left out of the body.
    OwnerRepo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendMode {
    /// Call the GitHub API directly, needs a token.
    DirectApi,
    /// JSON document posted to a relay.
    RelayJson { path: RelayPath },
    /// Query string posted to a relay with an empty body.
    RelayQuery,
}

/// Process wide description of where bug reports go. Assembled once by the host and handed to
/// [`crate::submit::prelude::IssueSubmitter`].
#[derive(Debug)]
pub struct DestinationConfig {
    pub backend: BackendMode,

    /// Relay base url. Optional for [`BackendMode::DirectApi`], where it overrides
    /// [`DEFAULT_GITHUB_API`].
    pub endpoint_base_url: Option<String>,

    pub auth_token: Option<SecretString>,

    /// Upper bound for the whole request. Unset leaves the transport defaults in charge.
    pub timeout: Option<Duration>,
}

impl DestinationConfig {
    pub fn new(backend: BackendMode) -> Self {
        Self {
            backend,
            endpoint_base_url: None,
            auth_token: None,
            timeout: None,
        }
    }

    pub fn with_endpoint(mut self, base_url: impl Into<String>) -> Self {
        self.endpoint_base_url = Some(base_url.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(SecretString::from(token.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
