//! Turning a bug report into an issue.
//!
//! A [`prelude::BugReport`] goes through an [`prelude::IssueSubmitter`], which hands it to one
//! [`prelude::IssueBackend`] picked from the [`prelude::DestinationConfig`]:
//!
//! - `DirectApi` calls the GitHub issues API with a token.
//! - `RelayJson` posts a JSON document to a relay that holds the credentials.
//! - `RelayQuery` posts the same fields as query parameters.
//!
//! Every submission is a single attempt. Failures come back classified so callers can tell
//! "never sent" from "network failed" from "backend said no".

mod backend;
mod config;
mod direct;
mod error;
mod relay;
mod report;
mod submitter;

pub mod prelude {
    pub use super::backend::{BackendKind, IssueBackend, MockIssueBackend, SubmitReceipt};
    pub use super::config::{BackendMode, DEFAULT_GITHUB_API, DestinationConfig, RelayPath};
    pub use super::direct::DirectApiBackend;
    pub use super::error::{BoxError, Delivery, SubmitError, TransportFailure};
    pub use super::relay::{RelayJsonBackend, RelayQueryBackend};
    pub use super::report::{BUG_LABEL, BugReport, BugReportBuilder, BugReportBuilderError};
    pub use super::submitter::{IssueSubmitter, SubmissionHandle, submit};
}
