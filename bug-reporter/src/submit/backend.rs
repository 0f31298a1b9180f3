use super::error::SubmitError;
use super::report::BugReport;
use async_trait::async_trait;
use mockall::automock;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum BackendKind {
    #[strum(serialize = "GitHub API")]
    DirectApi,
    #[strum(serialize = "JSON relay")]
    RelayJson,
    #[strum(serialize = "query relay")]
    RelayQuery,
}

/// What a backend reported back for an accepted bug report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub backend: BackendKind,
    pub status: u16,
    /// Link to the created issue, when the backend sent one back.
    pub issue_url: Option<String>,
}

/// Something that can turn a [`BugReport`] into an issue.
///
/// Implementations send exactly one request per call and never retry.
#[automock]
#[async_trait]
pub trait IssueBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    async fn create_issue(&self, report: &BugReport) -> Result<SubmitReceipt, SubmitError>;
}

pub(crate) fn receipt_for(
    backend: BackendKind,
    status: u16,
    body: String,
) -> Result<SubmitReceipt, SubmitError> {
    debug!(%backend, status, body = %body, "Backend responded");

    if !(200..=299).contains(&status) {
        return Err(SubmitError::HttpStatus { status, body });
    }

    Ok(SubmitReceipt {
        backend,
        status,
        issue_url: issue_url_from_body(&body),
    })
}

/// GitHub and most relays echo the created issue back, `html_url` is the one people can open.
fn issue_url_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["html_url", "htmlUrl", "url"]
        .iter()
        .find_map(|key| value.get(key).and_then(|url| url.as_str()))
        .map(|url| url.to_string())
}

/// Append percent encoded path segments to `base`, keeping whatever path prefix it had.
pub(crate) fn append_segments(base: &Url, segments: &[&str]) -> Result<Url, SubmitError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SubmitError::Configuration(format!("{} can not be used as a base url", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_statuses_produce_receipts() {
        let receipt = receipt_for(
            BackendKind::RelayJson,
            201,
            r#"{"html_url":"https://github.com/acme/app/issues/7"}"#.to_string(),
        )
        .unwrap();

        assert_eq!(201, receipt.status);
        assert_eq!(
            Some("https://github.com/acme/app/issues/7".to_string()),
            receipt.issue_url
        );
    }

    #[test]
    fn plain_text_success_has_no_issue_url() {
        let receipt = receipt_for(BackendKind::RelayQuery, 200, "ok".to_string()).unwrap();

        assert_eq!(None, receipt.issue_url);
    }

    #[test]
    fn other_statuses_keep_the_body() {
        let error = receipt_for(
            BackendKind::RelayJson,
            422,
            r#"{"message":"validation failed"}"#.to_string(),
        )
        .unwrap_err();

        match error {
            SubmitError::HttpStatus { status, body } => {
                assert_eq!(422, status);
                assert_eq!(r#"{"message":"validation failed"}"#, body);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn redirects_are_not_success() {
        assert!(receipt_for(BackendKind::RelayJson, 302, String::new()).is_err());
    }

    #[test]
    fn segments_keep_base_prefix() {
        let base = Url::parse("https://relay.example.com/api/").unwrap();
        let url = append_segments(&base, &["issue", "new-bug"]).unwrap();

        assert_eq!("https://relay.example.com/api/issue/new-bug", url.as_str());
    }

    #[test]
    fn segments_are_percent_encoded() {
        let base = Url::parse("http://localhost:8080").unwrap();
        let url = append_segments(&base, &["issue", "my org", "a/b"]).unwrap();

        assert_eq!("/issue/my%20org/a%2Fb", url.path());
    }
}
