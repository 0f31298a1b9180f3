use crate::models::prelude::{
    BackendSpec, HelpMetadata, InternalModel, ModelMetadata, ModelRoot, RelayPathSpec,
    V1AlphaBugReportDestination,
};
use crate::submit::prelude::{BackendMode, DestinationConfig, RelayPath};
use anyhow::anyhow;
use serde_yaml::Value;
use std::time::Duration;

/// How a [`Destination`] reaches its issue tracker.
#[derive(Debug, PartialEq, Clone)]
pub enum DestinationBackend {
    DirectApi { base_url: Option<String> },
    RelayJson { base_url: String, path: RelayPath },
    RelayQuery { base_url: String },
}

impl DestinationBackend {
    pub fn mode(&self) -> BackendMode {
        match self {
            DestinationBackend::DirectApi { .. } => BackendMode::DirectApi,
            DestinationBackend::RelayJson { path, .. } => BackendMode::RelayJson { path: *path },
            DestinationBackend::RelayQuery { .. } => BackendMode::RelayQuery,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        match self {
            DestinationBackend::DirectApi { base_url } => base_url.as_deref(),
            DestinationBackend::RelayJson { base_url, .. }
            | DestinationBackend::RelayQuery { base_url } => Some(base_url),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Destination {
    pub full_name: String,
    pub metadata: ModelMetadata,
    pub owner: String,
    pub repo: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub timeout: Option<Duration>,
    pub backend: DestinationBackend,
}

pub const ENV_DESTINATION_NAME: &str = "env";

impl Destination {
    /// The destination used when no `BugReportDestination` is configured, assembled from
    /// environment values. A relay url selects the JSON relay, otherwise the GitHub API is used.
    pub fn from_env(owner: Option<&str>, repo: Option<&str>, relay_url: Option<&str>) -> Self {
        let backend = match relay_url {
            Some(base_url) => DestinationBackend::RelayJson {
                base_url: base_url.to_string(),
                path: RelayPath::NewBug,
            },
            None => DestinationBackend::DirectApi { base_url: None },
        };

        let mut metadata = ModelMetadata::new(ENV_DESTINATION_NAME);
        metadata.description = Some("Built from BUG_REPORT_* environment variables".to_string());

        Self {
            full_name: format!("BugReportDestination/{}", ENV_DESTINATION_NAME),
            metadata,
            owner: owner.unwrap_or_default().to_string(),
            repo: repo.unwrap_or_default().to_string(),
            labels: Vec::new(),
            assignees: Vec::new(),
            timeout: None,
            backend,
        }
    }

    /// Everything the submitter needs except credentials.
    pub fn destination_config(&self) -> DestinationConfig {
        let mut config = DestinationConfig::new(self.backend.mode());
        if let Some(base_url) = self.backend.base_url() {
            config = config.with_endpoint(base_url);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

impl HelpMetadata for Destination {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn full_name(&self) -> String {
        self.full_name.to_string()
    }
}

impl TryFrom<V1AlphaBugReportDestination> for Destination {
    type Error = anyhow::Error;

    fn try_from(value: V1AlphaBugReportDestination) -> Result<Self, Self::Error> {
        let full_name = value.full_name();
        let backend = match value.spec.backend {
            BackendSpec::DirectApi(direct) => DestinationBackend::DirectApi {
                base_url: direct.base_url,
            },
            BackendSpec::RelayJson(relay) => DestinationBackend::RelayJson {
                base_url: relay.base_url,
                path: match relay.path {
                    RelayPathSpec::NewBug => RelayPath::NewBug,
                    RelayPathSpec::OwnerRepo => RelayPath::OwnerRepo,
                },
            },
            BackendSpec::RelayQuery(relay) => DestinationBackend::RelayQuery {
                base_url: relay.base_url,
            },
        };

        Ok(Destination {
            full_name,
            metadata: value.metadata,
            owner: value.spec.owner,
            repo: value.spec.repo,
            labels: value.spec.labels,
            assignees: value.spec.assignees,
            timeout: value.spec.timeout_seconds.map(Duration::from_secs),
            backend,
        })
    }
}

impl TryFrom<ModelRoot<Value>> for Destination {
    type Error = anyhow::Error;

    fn try_from(value: ModelRoot<Value>) -> Result<Self, Self::Error> {
        match V1AlphaBugReportDestination::known_type(&value)? {
            Some(known) => Destination::try_from(known),
            None => Err(anyhow!(
                "{} is not a known resource type",
                value.full_name()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::parse_destinations_from_string;
    use std::path::Path;

    #[test]
    fn relay_query_destination_builds_config() {
        let text = "
apiVersion: bug-reporter.dev/v1alpha
kind: BugReportDestination
metadata:
  name: query
spec:
  owner: acme
  repo: app
  timeoutSeconds: 5
  backend:
    relayQuery:
      baseUrl: https://relay.example.com/bugs
";
        let destinations =
            parse_destinations_from_string(Path::new("/foo/bar/.bug-report/query.yaml"), text)
                .unwrap();
        let destination = destinations.first().unwrap();

        assert_eq!("BugReportDestination/query", destination.full_name());
        assert_eq!(
            "/foo/bar/.bug-report/query.yaml",
            destination.metadata().file_path()
        );

        let config = destination.destination_config();
        assert_eq!(BackendMode::RelayQuery, config.backend);
        assert_eq!(
            Some("https://relay.example.com/bugs"),
            config.endpoint_base_url.as_deref()
        );
        assert_eq!(Some(Duration::from_secs(5)), config.timeout);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn owner_repo_path_is_carried_over() {
        let text = "
apiVersion: bug-reporter.dev/v1alpha
kind: BugReportDestination
metadata:
  name: relay
spec:
  owner: acme
  repo: app
  backend:
    relayJson:
      baseUrl: https://relay.example.com
      path: ownerRepo
";
        let destinations =
            parse_destinations_from_string(Path::new("/tmp/relay.yaml"), text).unwrap();

        assert_eq!(
            BackendMode::RelayJson {
                path: RelayPath::OwnerRepo
            },
            destinations[0].backend.mode()
        );
    }

    #[test]
    fn env_destination_prefers_relay() {
        let destination = Destination::from_env(Some("acme"), Some("app"), Some("http://relay"));

        assert_eq!(ENV_DESTINATION_NAME, destination.name());
        assert_eq!(
            BackendMode::RelayJson {
                path: RelayPath::NewBug
            },
            destination.backend.mode()
        );
        assert_eq!(Some("http://relay"), destination.backend.base_url());
    }

    #[test]
    fn env_destination_falls_back_to_github() {
        let destination = Destination::from_env(None, None, None);

        assert_eq!(BackendMode::DirectApi, destination.backend.mode());
        assert_eq!(None, destination.backend.base_url());
        assert_eq!("", destination.owner);
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        let text = "
apiVersion: bug-reporter.dev/v1alpha
kind: Other
metadata:
  name: other
spec: {}
";
        assert!(parse_destinations_from_string(Path::new("/tmp/other.yaml"), text).is_err());
    }
}
