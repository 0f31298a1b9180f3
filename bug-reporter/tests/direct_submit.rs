use bug_reporter::prelude::*;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn report() -> BugReport {
    BugReportBuilder::default()
        .title("Crash on save")
        .body("Steps to reproduce")
        .owner("acme")
        .repo("app")
        .assignee("octocat")
        .bug_label()
        .build()
        .unwrap()
}

fn github(server: &MockServer) -> DestinationConfig {
    DestinationConfig::new(BackendMode::DirectApi)
        .with_endpoint(server.base_url())
        .with_token("ghp_test_token")
}

#[tokio::test]
async fn creates_issue_through_api() {
    let server = MockServer::start();
    let issues = server.mock(|when, then| {
        when.method(POST)
            .path("/repos/acme/app/issues")
            .header("authorization", "Bearer ghp_test_token")
            .json_body(json!({
                "title": "Crash on save",
                "body": "Steps to reproduce",
                "assignees": ["octocat"],
                "labels": ["bug"],
            }));
        then.status(201).json_body(json!({
            "number": 42,
            "html_url": "https://github.com/acme/app/issues/42",
        }));
    });

    let receipt = submit(&report(), &github(&server)).await.unwrap();

    issues.assert();
    assert_eq!(BackendKind::DirectApi, receipt.backend);
    assert_eq!(201, receipt.status);
    assert_eq!(
        Some("https://github.com/acme/app/issues/42"),
        receipt.issue_url.as_deref()
    );
}

#[tokio::test]
async fn validation_failure_is_not_retried() {
    let server = MockServer::start();
    let issues = server.mock(|when, then| {
        when.method(POST).path("/repos/acme/app/issues");
        then.status(422)
            .header("content-type", "application/json")
            .body(r#"{"message":"validation failed"}"#);
    });

    let error = submit(&report(), &github(&server)).await.unwrap_err();

    issues.assert_calls(1);
    match error {
        SubmitError::HttpStatus { status, body } => {
            assert_eq!(422, status);
            assert_eq!(r#"{"message":"validation failed"}"#, body);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn server_error_is_attempted_once() {
    let server = MockServer::start();
    let issues = server.mock(|when, then| {
        when.method(POST).path("/repos/acme/app/issues");
        then.status(502).body("bad gateway");
    });

    let error = submit(&report(), &github(&server)).await.unwrap_err();

    issues.assert_calls(1);
    assert_eq!(Delivery::Rejected, error.delivery());
}

#[tokio::test]
async fn missing_token_never_calls_api() {
    let server = MockServer::start();
    let issues = server.mock(|when, then| {
        when.method(POST);
        then.status(201);
    });
    let config = DestinationConfig::new(BackendMode::DirectApi).with_endpoint(server.base_url());

    let error = submit(&report(), &config).await.unwrap_err();

    issues.assert_calls(0);
    assert!(matches!(error, SubmitError::Configuration(_)));
    assert_eq!(Delivery::NotSent, error.delivery());
}

#[tokio::test]
async fn slow_api_times_out_after_one_attempt() {
    let server = MockServer::start();
    let issues = server.mock(|when, then| {
        when.method(POST).path("/repos/acme/app/issues");
        then.status(201).delay(Duration::from_secs(3));
    });
    let config = github(&server).with_timeout(Duration::from_millis(300));

    let error = submit(&report(), &config).await.unwrap_err();

    issues.assert_calls(1);
    assert!(matches!(
        error,
        SubmitError::Transport {
            kind: TransportFailure::Timeout,
            ..
        }
    ));
    assert_eq!(Delivery::Failed, error.delivery());
}

#[tokio::test]
async fn unreachable_api_is_a_connect_failure() {
    let config = DestinationConfig::new(BackendMode::DirectApi)
        .with_endpoint("http://127.0.0.1:1")
        .with_token("ghp_test_token");

    let error = submit(&report(), &config).await.unwrap_err();

    assert!(matches!(
        error,
        SubmitError::Transport {
            kind: TransportFailure::Connect,
            ..
        }
    ));
    assert_eq!(Delivery::Failed, error.delivery());
}
