use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Label attached to every report filed by the reporter.
pub const BUG_LABEL: &str = "bug";

/// A bug report on its way to an issue tracker.
///
/// Reports are built once with [`BugReportBuilder`] and never change afterwards, there are no
/// setters. The builder only rejects a blank title; an empty `owner` or `repo` is accepted here
/// and refused at submit time, before anything goes over the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(rename_all = "camelCase")]
pub struct BugReport {
    title: String,

    #[builder(default)]
    #[serde(default)]
    body: String,

    owner: String,

    repo: String,

    #[builder(default, setter(into, each(name = "assignee", into)))]
    #[serde(default)]
    assignees: Vec<String>,

    #[builder(default, setter(into, each(name = "label", into)))]
    #[serde(default)]
    labels: Vec<String>,

    /// Only understood by the GitHub API, relays never receive it.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    milestone: Option<u64>,
}

impl BugReportBuilder {
    fn validate(&self) -> Result<(), String> {
        match &self.title {
            Some(title) if title.trim().is_empty() => {
                Err("Bug report title must not be empty".to_string())
            }
            _ => Ok(()),
        }
    }

    /// Attach the `bug` label, unless it's already there.
    pub fn bug_label(&mut self) -> &mut Self {
        let labels = self.labels.get_or_insert_with(Vec::new);
        if !labels.iter().any(|label| label == BUG_LABEL) {
            labels.push(BUG_LABEL.to_string());
        }
        self
    }
}

impl BugReport {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    pub fn assignees(&self) -> &[String] {
        &self.assignees
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn milestone(&self) -> Option<u64> {
        self.milestone
    }
}
