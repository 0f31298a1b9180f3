use super::backend::{BackendKind, IssueBackend, SubmitReceipt};
use super::config::{BackendMode, DestinationConfig};
use super::direct::DirectApiBackend;
use super::error::{SubmitError, TransportFailure};
use super::relay::{RelayJsonBackend, RelayQueryBackend};
use super::report::BugReport;
use crate::shared::prelude::submission_spinner;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, instrument};
use tracing_indicatif::span_ext::IndicatifSpanExt;

/// Build a submitter for `config` and send `report` with it.
pub async fn submit(
    report: &BugReport,
    config: &DestinationConfig,
) -> Result<SubmitReceipt, SubmitError> {
    IssueSubmitter::new(config)?.submit(report).await
}

/// Sends bug reports to the backend picked by a [`DestinationConfig`].
///
/// Cloning is cheap and clones share the backend. Each call to [`IssueSubmitter::submit`] is
/// one request, calls running at the same time don't know about each other.
#[derive(Clone)]
pub struct IssueSubmitter {
    backend: Arc<dyn IssueBackend>,
}

impl IssueSubmitter {
    pub fn new(config: &DestinationConfig) -> Result<Self, SubmitError> {
        let backend: Arc<dyn IssueBackend> = match &config.backend {
            BackendMode::DirectApi => Arc::new(DirectApiBackend::new(config)?),
            BackendMode::RelayJson { path } => Arc::new(RelayJsonBackend::new(config, *path)?),
            BackendMode::RelayQuery => Arc::new(RelayQueryBackend::new(config)?),
        };

        Ok(Self::with_backend(backend))
    }

    pub fn with_backend(backend: Arc<dyn IssueBackend>) -> Self {
        Self { backend }
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    #[instrument("bug report submit", skip_all, fields(backend = %self.backend.kind(), owner = report.owner(), repo = report.repo(), indicatif.pb_show = true))]
    pub async fn submit(&self, report: &BugReport) -> Result<SubmitReceipt, SubmitError> {
        check_destination(report)?;

        let span = Span::current();
        span.pb_set_style(&submission_spinner());
        span.pb_set_message(&format!("Submitting bug report to {}", self.backend.kind()));

        let result = self.backend.create_issue(report).await;
        match &result {
            Ok(receipt) => debug!(status = receipt.status, "Bug report was accepted"),
            Err(e) => debug!(delivery = ?e.delivery(), "Bug report submission failed. {}", e),
        }

        result
    }

    /// Run the submission on the tokio runtime. The returned handle can be awaited for the
    /// outcome or dropped to let the submission finish on its own.
    pub fn spawn(&self, report: BugReport) -> SubmissionHandle {
        let submitter = self.clone();
        let task = tokio::spawn(
            async move { submitter.submit(&report).await }.instrument(Span::current()),
        );

        SubmissionHandle { task }
    }
}

fn check_destination(report: &BugReport) -> Result<(), SubmitError> {
    if report.owner().trim().is_empty() {
        return Err(SubmitError::Configuration(
            "The repository owner is missing".to_string(),
        ));
    }

    if report.repo().trim().is_empty() {
        return Err(SubmitError::Configuration(
            "The repository name is missing".to_string(),
        ));
    }

    Ok(())
}

/// A submission started with [`IssueSubmitter::spawn`].
#[must_use = "dropping the handle detaches the submission, await it to learn the outcome"]
pub struct SubmissionHandle {
    task: JoinHandle<Result<SubmitReceipt, SubmitError>>,
}

impl SubmissionHandle {
    /// Cancel the submission. Awaiting the handle afterwards yields a cancelled transport error,
    /// unless the request already finished.
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Future for SubmissionHandle {
    type Output = Result<SubmitReceipt, SubmitError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.task).poll(cx).map(|joined| match joined {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => Err(SubmitError::transport(TransportFailure::Cancelled, e)),
            Err(e) => Err(SubmitError::transport(TransportFailure::Other, e)),
        })
    }
}
