use crate::models::v1alpha::V1AlphaApiVersion;
use crate::models::{HelpMetadata, InternalModel, ModelMetadata};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Send reports straight to the GitHub API. The token comes from `BUG_REPORT_GITHUB_TOKEN`,
/// never from config files.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(deny_unknown_fields)]
pub struct DirectApiSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// API root, for GitHub Enterprise. Defaults to `https://api.github.com`.
    pub base_url: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum RelayPathSpec {
    /// `POST {baseUrl}/issue/new-bug` with owner and repo in the body
    #[default]
    NewBug,
    /// `POST {baseUrl}/issue/{owner}/{repo}`
    OwnerRepo,
}

/// Send reports to a relay as JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(deny_unknown_fields)]
pub struct RelayJsonSpec {
    /// Base url of the relay
    pub base_url: String,

    #[serde(default)]
    /// Which route of the relay to post to
    pub path: RelayPathSpec,
}

/// Send reports to a relay as query parameters.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(deny_unknown_fields)]
pub struct RelayQuerySpec {
    /// Base url of the relay
    pub base_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum BackendSpec {
    DirectApi(DirectApiSpec),
    RelayJson(RelayJsonSpec),
    RelayQuery(RelayQuerySpec),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(deny_unknown_fields)]
pub struct DestinationSpec {
    /// `owner` of the repository issues are created in
    pub owner: String,

    /// `repo` the name of the repository issues are created in
    pub repo: String,

    #[serde(default)]
    /// Labels added to every report, `bug` is always added
    pub labels: Vec<String>,

    #[serde(default)]
    /// Users assigned to every report
    pub assignees: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Give up on a request after this many seconds. Leave unset to use the HTTP client defaults.
    pub timeout_seconds: Option<u64>,

    #[serde(with = "serde_yaml::with::singleton_map")]
    #[schemars(with = "BackendSpec")]
    /// How the report reaches the issue tracker
    pub backend: BackendSpec,
}

#[derive(Serialize, Deserialize, Debug, strum::Display, Clone, PartialEq, JsonSchema)]
pub enum DestinationKind {
    #[strum(serialize = "BugReportDestination")]
    BugReportDestination,
}

/// A `BugReportDestination` tells where bug reports go.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
#[schemars(deny_unknown_fields)]
pub struct V1AlphaBugReportDestination {
    /// API version of the resource
    pub api_version: V1AlphaApiVersion,
    /// The type of resource.
    pub kind: DestinationKind,
    /// Standard set of options including name, description for the resource.
    /// Together `kind` and `metadata.name` are required to be unique. If there are duplicate, the
    /// resources "closest" to the execution dir will take precedence.
    pub metadata: ModelMetadata,
    /// Options for the resource.
    pub spec: DestinationSpec,
}

impl HelpMetadata for V1AlphaBugReportDestination {
    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    fn full_name(&self) -> String {
        format!("{}/{}", self.kind, self.name())
    }
}

impl InternalModel for V1AlphaBugReportDestination {
    fn int_api_version() -> String {
        V1AlphaApiVersion::V1Alpha.to_string()
    }

    fn int_kind() -> String {
        DestinationKind::BugReportDestination.to_string()
    }

    fn set_file_path(&mut self, file_path: Option<String>) {
        self.metadata.file_path = file_path;
    }
}
