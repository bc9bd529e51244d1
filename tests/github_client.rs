use assert_cmd::prelude::*;
use gitpulse::auth::{exchange_code, OAuthSettings};
use gitpulse::error::GitPulseError;
use gitpulse::github::{fetch_all_details, ClientConfig, Credentials, GitHubClient};
use gitpulse::model::{CommitRecord, Repository, YearFilter};
use httpmock::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::process::Command;
use std::time::Duration;

fn client(server: &MockServer, retry_attempts: u32) -> GitHubClient {
    let config = ClientConfig {
        api_url: server.base_url(),
        retry_attempts,
        retry_delay: Duration::from_millis(1),
        concurrency: 2,
        ..Default::default()
    };
    GitHubClient::new(Credentials::token("test-token"), config).unwrap()
}

fn repo(name: &str) -> Repository {
    Repository {
        name: name.to_string(),
        ..Default::default()
    }
}

fn commit(date: &str) -> serde_json::Value {
    json!({ "sha": "abc", "commit": { "author": { "name": "octo", "date": date } } })
}

#[tokio::test]
async fn partial_failure_keeps_every_repository() {
    let server = MockServer::start_async().await;

    let alpha_languages = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/alpha/languages")
                .header("authorization", "Bearer test-token");
            then.status(200).json_body(json!({ "Rust": 1200, "Shell": 30 }));
        })
        .await;
    let alpha_commits = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/alpha/commits")
                .query_param("since", "2024-01-01T00:00:00Z")
                .query_param("until", "2024-12-31T23:59:59Z");
            then.status(200).json_body(json!([
                commit("2024-01-01T10:00:00Z"),
                commit("2024-01-01T20:00:00Z"),
                commit("2024-01-02T00:00:00Z"),
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/alpha/pulls")
                .query_param("state", "all");
            then.status(200).json_body(json!([{ "id": 1 }, { "id": 2 }]));
        })
        .await;
    let beta_languages = server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/octo/beta/languages");
            then.status(500).json_body(json!({ "message": "Server Error" }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/octo/beta/commits");
            then.status(200).json_body(json!([]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/octo/beta/pulls");
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = client(&server, 0);
    let fetches = fetch_all_details(&client, "octo", vec![repo("alpha"), repo("beta")], YearFilter::Year(2024)).await;

    assert_eq!(fetches.len(), 2);
    assert_eq!(fetches[0].repo.name, "alpha");
    assert_eq!(fetches[1].repo.name, "beta");

    let alpha = fetches[0].details.as_ref().unwrap();
    assert_eq!(alpha.languages.get("Rust"), Some(&1200));
    assert_eq!(alpha.pulls, 2);
    assert_eq!(
        alpha.commits,
        vec![
            CommitRecord::new("2024-01-01T00:00:00Z", 2),
            CommitRecord::new("2024-01-02T00:00:00Z", 1),
        ]
    );

    assert!(fetches[1].is_failed());
    assert!(fetches[1].error.as_deref().unwrap().contains("500"));
    let beta = fetches[1].clone().into_repository();
    assert!(beta.languages.is_empty());
    assert_eq!(beta.commits.total(), 0);

    alpha_languages.assert_async().await;
    alpha_commits.assert_async().await;
    beta_languages.assert_hits_async(1).await;
}

#[tokio::test]
async fn transient_errors_are_retried() {
    let server = MockServer::start_async().await;
    let user = server
        .mock_async(|when, then| {
            when.method(GET).path("/users/octo");
            then.status(503).body("unavailable");
        })
        .await;

    let err = client(&server, 2).user("octo").await.unwrap_err();
    assert!(matches!(err, GitPulseError::Api { status: 503, .. }));
    user.assert_hits_async(3).await;
}

#[tokio::test]
async fn client_errors_fail_immediately() {
    let server = MockServer::start_async().await;
    let user = server
        .mock_async(|when, then| {
            when.method(GET).path("/users/ghost");
            then.status(404).json_body(json!({ "message": "Not Found" }));
        })
        .await;

    let err = client(&server, 3).user("ghost").await.unwrap_err();
    match err {
        GitPulseError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("unexpected error: {other}"),
    }
    user.assert_hits_async(1).await;
}

#[tokio::test]
async fn pull_count_follows_pages() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/busy/pulls")
                .query_param("state", "all")
                .query_param("per_page", "2")
                .query_param("page", "1");
            then.status(200).json_body(json!([{ "id": 1 }, { "id": 2 }]));
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/repos/octo/busy/pulls")
                .query_param("page", "2");
            then.status(200).json_body(json!([{ "id": 3 }]));
        })
        .await;

    let config = ClientConfig {
        api_url: server.base_url(),
        per_page: 2,
        ..Default::default()
    };
    let client = GitHubClient::new(Credentials::anonymous(), config).unwrap();
    assert_eq!(client.pull_count("octo", "busy").await.unwrap(), 3);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn empty_repository_has_no_commit_records() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/repos/octo/empty/commits");
            then.status(409).json_body(json!({ "message": "Git Repository is empty." }));
        })
        .await;

    let records = client(&server, 0)
        .commit_activity("octo", "empty", YearFilter::All)
        .await
        .unwrap();
    assert!(records.is_empty());
}

fn oauth_settings(server: &MockServer) -> OAuthSettings {
    OAuthSettings {
        client_id: "client".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: Some("http://localhost/cb".to_string()),
        token_url: server.url("/login/oauth/access_token"),
    }
}

#[tokio::test]
async fn oauth_exchange_returns_token() {
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/login/oauth/access_token")
                .header("accept", "application/json")
                .json_body(json!({
                    "client_id": "client",
                    "client_secret": "secret",
                    "code": "the-code",
                    "redirect_uri": "http://localhost/cb"
                }));
            then.status(200)
                .json_body(json!({ "access_token": "gho_123", "token_type": "bearer", "scope": "repo" }));
        })
        .await;

    let http = reqwest::Client::new();
    let access = exchange_code(&http, &oauth_settings(&server), "the-code").await.unwrap();
    assert_eq!(access, "gho_123");
    token.assert_async().await;
}

#[tokio::test]
async fn oauth_exchange_maps_error_description() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/login/oauth/access_token");
            then.status(200).json_body(json!({
                "error": "bad_verification_code",
                "error_description": "The code passed is incorrect or expired."
            }));
        })
        .await;

    let http = reqwest::Client::new();
    let err = exchange_code(&http, &oauth_settings(&server), "stale").await.unwrap_err();
    match err {
        GitPulseError::Auth(message) => assert_eq!(message, "The code passed is incorrect or expired."),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn oauth_exchange_rejects_empty_code_without_request() {
    let server = MockServer::start_async().await;
    let token = server
        .mock_async(|when, then| {
            when.method(POST).path("/login/oauth/access_token");
            then.status(200).json_body(json!({ "access_token": "never" }));
        })
        .await;

    let http = reqwest::Client::new();
    let err = exchange_code(&http, &oauth_settings(&server), "  ").await.unwrap_err();
    assert!(matches!(err, GitPulseError::Auth(_)));
    token.assert_hits_async(0).await;
}

#[test]
fn streaks_command_fetches_from_api() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/users/octo");
        then.status(200).json_body(json!({ "login": "octo", "name": "Octo Cat", "followers": 3 }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/users/octo/repos").query_param("page", "1");
        then.status(200).json_body(json!([
            { "id": 7, "name": "alpha", "owner": { "login": "octo" }, "created_at": "2024-01-01T00:00:00Z" }
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/octo/alpha/languages");
        then.status(200).json_body(json!({ "Rust": 100 }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/octo/alpha/commits");
        then.status(200).json_body(json!([
            commit("2024-06-14T08:00:00Z"),
            commit("2024-06-15T08:00:00Z"),
            commit("2024-06-15T09:00:00Z"),
        ]));
    });
    server.mock(|when, then| {
        when.method(GET).path("/repos/octo/alpha/pulls");
        then.status(200).json_body(json!([]));
    });

    let out = Command::cargo_bin("gitpulse")
        .unwrap()
        .env_remove("GITHUB_TOKEN")
        .env_remove("RUST_LOG")
        .args(["--user", "octo", "--api-url"])
        .arg(server.base_url())
        .args(["--year", "2024", "--today", "2024-06-15", "streaks", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["login"], "octo");
    assert_eq!(v["stats"]["total_commits"], 3);
    assert_eq!(v["stats"]["current_streak"], 2);
    assert_eq!(v["contributions"]["2024-06-15"], 2);
}
