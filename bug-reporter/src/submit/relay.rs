use super::backend::{BackendKind, IssueBackend, SubmitReceipt, append_segments, receipt_for};
use super::config::{DestinationConfig, RelayPath};
use super::error::{SubmitError, TransportFailure};
use super::report::BugReport;
use async_trait::async_trait;
use itertools::Itertools;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use tracing::debug;
use url::Url;

/// JSON document accepted by the relay.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RelayIssue<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    owner: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repo: Option<&'a str>,
    assignees: &'a [String],
    labels: &'a [String],
}

impl<'a> RelayIssue<'a> {
    fn new(report: &'a BugReport, path: RelayPath) -> Self {
        let (owner, repo) = match path {
            RelayPath::NewBug => (Some(report.owner()), Some(report.repo())),
            RelayPath::OwnerRepo => (None, None),
        };

        Self {
            title: report.title(),
            body: report.body(),
            owner,
            repo,
            assignees: report.assignees(),
            labels: report.labels(),
        }
    }
}

pub(crate) fn encode_relay_json(
    report: &BugReport,
    path: RelayPath,
) -> Result<Vec<u8>, SubmitError> {
    serde_json::to_vec(&RelayIssue::new(report, path))
        .map_err(|e| SubmitError::Encoding(e.to_string()))
}

pub(crate) fn relay_json_url(
    base: &Url,
    report: &BugReport,
    path: RelayPath,
) -> Result<Url, SubmitError> {
    match path {
        RelayPath::NewBug => append_segments(base, &["issue", "new-bug"]),
        RelayPath::OwnerRepo => append_segments(base, &["issue", report.owner(), report.repo()]),
    }
}

pub(crate) fn relay_query_url(base: &Url, report: &BugReport) -> Result<Url, SubmitError> {
    let assignees = comma_joined("assignees", report.assignees())?;
    let labels = comma_joined("labels", report.labels())?;

    let mut url = append_segments(base, &["issue", "new-bug"])?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("owner", report.owner())
            .append_pair("repo", report.repo())
            .append_pair("title", report.title())
            .append_pair("body", report.body());
        if let Some(assignees) = &assignees {
            query.append_pair("assignees", assignees);
        }
        if let Some(labels) = &labels {
            query.append_pair("labels", labels);
        }
    }

    Ok(url)
}

/// `None` for an empty list, the parameter is left out entirely.
fn comma_joined(name: &str, values: &[String]) -> Result<Option<String>, SubmitError> {
    if values.is_empty() {
        return Ok(None);
    }

    if let Some(value) = values.iter().find(|value| value.contains(',')) {
        return Err(SubmitError::Encoding(format!(
            "{} entry '{}' contains a comma and can not be sent as a query parameter",
            name, value
        )));
    }

    Ok(Some(values.iter().join(",")))
}

fn relay_base_url(config: &DestinationConfig) -> Result<Url, SubmitError> {
    let raw = config
        .endpoint_base_url
        .as_deref()
        .map(str::trim)
        .filter(|base| !base.is_empty())
        .ok_or_else(|| {
            SubmitError::Configuration("A relay url is required to send bug reports".to_string())
        })?;

    let url = Url::parse(raw)
        .map_err(|e| SubmitError::Configuration(format!("Invalid relay url {}. {}", raw, e)))?;
    if url.cannot_be_a_base() {
        return Err(SubmitError::Configuration(format!(
            "Relay url {} can not be used as a base url",
            raw
        )));
    }

    Ok(url)
}

fn relay_client(config: &DestinationConfig) -> Result<reqwest::Client, SubmitError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| SubmitError::Configuration(format!("Unable to create HTTP client. {}", e)))
}

fn transport_error(error: reqwest::Error) -> SubmitError {
    let kind = if error.is_timeout() {
        TransportFailure::Timeout
    } else if error.is_connect() {
        TransportFailure::Connect
    } else {
        TransportFailure::Other
    };

    SubmitError::transport(kind, error)
}

async fn read_response(
    backend: BackendKind,
    response: reqwest::Response,
) -> Result<SubmitReceipt, SubmitError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(transport_error)?;

    receipt_for(backend, status, body)
}

/// Posts the report as a JSON document.
pub struct RelayJsonBackend {
    client: reqwest::Client,
    base_url: Url,
    path: RelayPath,
}

impl RelayJsonBackend {
    pub fn new(config: &DestinationConfig, path: RelayPath) -> Result<Self, SubmitError> {
        Ok(Self {
            client: relay_client(config)?,
            base_url: relay_base_url(config)?,
            path,
        })
    }
}

#[async_trait]
impl IssueBackend for RelayJsonBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RelayJson
    }

    async fn create_issue(&self, report: &BugReport) -> Result<SubmitReceipt, SubmitError> {
        let url = relay_json_url(&self.base_url, report, self.path)?;
        let body = encode_relay_json(report, self.path)?;
        debug!(url = %url, body = %String::from_utf8_lossy(&body), "Sending bug report to relay");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(BackendKind::RelayJson, response).await
    }
}

/// Posts the report as query parameters with an empty body.
pub struct RelayQueryBackend {
    client: reqwest::Client,
    base_url: Url,
}

impl RelayQueryBackend {
    pub fn new(config: &DestinationConfig) -> Result<Self, SubmitError> {
        Ok(Self {
            client: relay_client(config)?,
            base_url: relay_base_url(config)?,
        })
    }
}

#[async_trait]
impl IssueBackend for RelayQueryBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::RelayQuery
    }

    async fn create_issue(&self, report: &BugReport) -> Result<SubmitReceipt, SubmitError> {
        let url = relay_query_url(&self.base_url, report)?;
        debug!(url = %url, "Sending bug report to relay");

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(transport_error)?;

        read_response(BackendKind::RelayQuery, response).await
    }
}
