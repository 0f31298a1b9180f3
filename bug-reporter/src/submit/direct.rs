use super::backend::{BackendKind, IssueBackend, SubmitReceipt, append_segments, receipt_for};
use super::config::{DEFAULT_GITHUB_API, DestinationConfig};
use super::error::SubmitError;
use super::report::BugReport;
use async_trait::async_trait;
use octocrab::Octocrab;
use octocrab::service::middleware::retry::RetryConfig;
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::debug;
use url::Url;

/// Body of `POST /repos/{owner}/{repo}/issues`.
#[derive(Serialize, Debug)]
pub(crate) struct CreateIssuePayload<'a> {
    title: &'a str,
    body: &'a str,
    assignees: &'a [String],
    labels: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    milestone: Option<u64>,
}

impl<'a> From<&'a BugReport> for CreateIssuePayload<'a> {
    fn from(report: &'a BugReport) -> Self {
        Self {
            title: report.title(),
            body: report.body(),
            assignees: report.assignees(),
            labels: report.labels(),
            milestone: report.milestone(),
        }
    }
}

/// Creates issues through the GitHub API with a personal token.
pub struct DirectApiBackend {
    client: Octocrab,
    base_url: Url,
}

impl DirectApiBackend {
    pub fn new(config: &DestinationConfig) -> Result<Self, SubmitError> {
        let token = config
            .auth_token
            .as_ref()
            .map(|token| token.expose_secret().trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                SubmitError::Configuration(
                    "A GitHub token is required to create issues through the GitHub API"
                        .to_string(),
                )
            })?;

        let base = config
            .endpoint_base_url
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .unwrap_or(DEFAULT_GITHUB_API);
        let base_url = Url::parse(base).map_err(|e| {
            SubmitError::Configuration(format!("Invalid GitHub API url {}. {}", base, e))
        })?;

        // octocrab retries server errors on its own, a submission is attempted at most once.
        let mut builder = Octocrab::builder()
            .base_uri(base_url.as_str())
            .map_err(|e| {
                SubmitError::Configuration(format!("Invalid GitHub API url {}. {}", base, e))
            })?
            .personal_token(token)
            .add_retry_config(RetryConfig::None);

        if let Some(timeout) = config.timeout {
            builder = builder
                .set_connect_timeout(Some(timeout))
                .set_read_timeout(Some(timeout))
                .set_write_timeout(Some(timeout));
        }

        let client = builder.build().map_err(|e| {
            SubmitError::Configuration(format!("Unable to create GitHub client. {}", e))
        })?;

        Ok(Self { client, base_url })
    }

    /// Route relative to the API root, octocrab puts it under `base_uri`.
    fn issues_route(&self, report: &BugReport) -> Result<String, SubmitError> {
        let mut root = self.base_url.clone();
        root.set_path("/");
        let url = append_segments(&root, &["repos", report.owner(), report.repo(), "issues"])?;
        Ok(url.path().to_string())
    }
}

#[async_trait]
impl IssueBackend for DirectApiBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::DirectApi
    }

    async fn create_issue(&self, report: &BugReport) -> Result<SubmitReceipt, SubmitError> {
        let route = self.issues_route(report)?;
        let payload = CreateIssuePayload::from(report);
        let encoded = serde_json::to_string(&payload)
            .map_err(|e| SubmitError::Encoding(e.to_string()))?;
        debug!(route = %route, body = %encoded, "Creating issue through the GitHub API");

        let response = self
            .client
            ._post(route.as_str(), Some(&payload))
            .await
            .map_err(SubmitError::from_transport_chain)?;
        let status = response.status().as_u16();
        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(SubmitError::from_transport_chain)?;

        receipt_for(BackendKind::DirectApi, status, body)
    }
}
