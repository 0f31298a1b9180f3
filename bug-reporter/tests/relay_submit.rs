use bug_reporter::prelude::*;
use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

fn report(title: &str) -> BugReport {
    BugReportBuilder::default()
        .title(title)
        .body("Steps to reproduce")
        .owner("acme")
        .repo("app")
        .label("ios")
        .bug_label()
        .build()
        .unwrap()
}

fn relay_json(server: &MockServer) -> DestinationConfig {
    DestinationConfig::new(BackendMode::RelayJson {
        path: RelayPath::NewBug,
    })
    .with_endpoint(server.base_url())
}

#[tokio::test]
async fn relay_json_creates_issue() {
    let server = MockServer::start();
    let relay = server.mock(|when, then| {
        when.method(POST)
            .path("/issue/new-bug")
            .header("content-type", "application/json")
            .json_body(json!({
                "title": "Crash on save",
                "body": "Steps to reproduce",
                "owner": "acme",
                "repo": "app",
                "assignees": [],
                "labels": ["ios", "bug"],
            }));
        then.status(201)
            .json_body(json!({ "html_url": "https://github.com/acme/app/issues/7" }));
    });

    let receipt = submit(&report("Crash on save"), &relay_json(&server))
        .await
        .unwrap();

    relay.assert();
    assert_eq!(BackendKind::RelayJson, receipt.backend);
    assert_eq!(201, receipt.status);
    assert_eq!(
        Some("https://github.com/acme/app/issues/7"),
        receipt.issue_url.as_deref()
    );
}

#[tokio::test]
async fn relay_json_owner_repo_path() {
    let server = MockServer::start();
    let relay = server.mock(|when, then| {
        when.method(POST).path("/issue/acme/app").json_body(json!({
            "title": "Crash on save",
            "body": "Steps to reproduce",
            "assignees": [],
            "labels": ["ios", "bug"],
        }));
        then.status(200);
    });
    let config = DestinationConfig::new(BackendMode::RelayJson {
        path: RelayPath::OwnerRepo,
    })
    .with_endpoint(server.base_url());

    let receipt = submit(&report("Crash on save"), &config).await.unwrap();

    relay.assert();
    assert_eq!(200, receipt.status);
    assert_eq!(None, receipt.issue_url);
}

#[tokio::test]
async fn rejected_report_keeps_status_and_body() {
    let server = MockServer::start();
    let relay = server.mock(|when, then| {
        when.method(POST).path("/issue/new-bug");
        then.status(422).body(r#"{"message":"validation failed"}"#);
    });

    let error = submit(&report("Crash on save"), &relay_json(&server))
        .await
        .unwrap_err();

    relay.assert_calls(1);
    assert_eq!(Delivery::Rejected, error.delivery());
    match error {
        SubmitError::HttpStatus { status, body } => {
            assert_eq!(422, status);
            assert_eq!(r#"{"message":"validation failed"}"#, body);
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[tokio::test]
async fn slow_relay_times_out() {
    let server = MockServer::start();
    let relay = server.mock(|when, then| {
        when.method(POST).path("/issue/new-bug");
        then.status(201).delay(Duration::from_secs(2));
    });
    let config = relay_json(&server).with_timeout(Duration::from_millis(200));

    let error = submit(&report("Crash on save"), &config).await.unwrap_err();

    relay.assert_calls(1);
    assert_eq!(Delivery::Failed, error.delivery());
    assert!(matches!(
        error,
        SubmitError::Transport {
            kind: TransportFailure::Timeout,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_relay_is_a_transport_error() {
    let config = DestinationConfig::new(BackendMode::RelayQuery).with_endpoint("http://127.0.0.1:1");

    let error = submit(&report("Crash on save"), &config).await.unwrap_err();

    assert!(matches!(error, SubmitError::Transport { .. }));
    assert_eq!(Delivery::Failed, error.delivery());
}

#[tokio::test]
async fn concurrent_submissions_stay_independent() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path("/issue/new-bug")
            .body_includes(r#""title":"First crash""#);
        then.status(201);
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path("/issue/new-bug")
            .body_includes(r#""title":"Second crash""#);
        then.status(201);
    });
    let submitter = IssueSubmitter::new(&relay_json(&server)).unwrap();

    let first_handle = submitter.spawn(report("First crash"));
    let second_handle = submitter.spawn(report("Second crash"));
    let (first_result, second_result) = tokio::join!(first_handle, second_handle);

    first_result.unwrap();
    second_result.unwrap();
    first.assert_calls(1);
    second.assert_calls(1);
}

#[tokio::test]
async fn relay_query_sends_fields_as_parameters() {
    let server = MockServer::start();
    let relay = server.mock(|when, then| {
        when.method(POST)
            .path("/issue/new-bug")
            .query_param("owner", "acme")
            .query_param("repo", "app")
            .query_param("title", "Crash on save")
            .query_param("body", "Steps to reproduce")
            .query_param("labels", "ios,bug")
            .body("");
        then.status(201);
    });
    let config = DestinationConfig::new(BackendMode::RelayQuery).with_endpoint(server.base_url());

    let receipt = submit(&report("Crash on save"), &config).await.unwrap();

    relay.assert();
    assert_eq!(BackendKind::RelayQuery, receipt.backend);
}

#[tokio::test]
async fn comma_in_label_is_never_sent() {
    let server = MockServer::start();
    let relay = server.mock(|when, then| {
        when.method(POST);
        then.status(201);
    });
    let config = DestinationConfig::new(BackendMode::RelayQuery).with_endpoint(server.base_url());
    let report = BugReportBuilder::default()
        .title("Crash on save")
        .owner("acme")
        .repo("app")
        .label("needs,triage")
        .build()
        .unwrap();

    let error = submit(&report, &config).await.unwrap_err();

    relay.assert_calls(0);
    assert!(matches!(error, SubmitError::Encoding(_)));
    assert_eq!(Delivery::NotSent, error.delivery());
}

#[tokio::test]
async fn empty_owner_is_never_sent() {
    let server = MockServer::start();
    let relay = server.mock(|when, then| {
        when.method(POST);
        then.status(201);
    });
    let report = BugReportBuilder::default()
        .title("Crash on save")
        .owner("")
        .repo("app")
        .build()
        .unwrap();

    let error = submit(&report, &relay_json(&server)).await.unwrap_err();

    relay.assert_calls(0);
    assert!(matches!(error, SubmitError::Configuration(_)));
}
