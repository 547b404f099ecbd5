//! Integration tests for the CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cli() -> Command {
    let mut cmd = Command::cargo_bin("repo-insight").unwrap();
    cmd.env_remove("GEMINI_API_KEY").env_remove("GITHUB_TOKEN");
    cmd
}

/// Config file pointing both upstream APIs at a mock server
fn config_for(url: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[network]\ngithub_api_base = \"{url}\"\ntimeout_secs = 5\n\n[ai]\napi_base = \"{url}\"\nmodel = \"gemini-test\"",
        url = url
    )
    .unwrap();
    file
}

#[test]
fn test_cli_analyze_help() {
    cli()
        .arg("analyze")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Analyze a single repository"));
}

#[test]
fn test_cli_search_help() {
    cli()
        .arg("search")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Search repositories by keyword"));
}

#[test]
fn test_cli_profile_help() {
    cli()
        .arg("profile")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Summarize a user's profile"));
}

#[test]
fn test_cli_rejects_single_segment_url() {
    cli()
        .arg("analyze")
        .arg("not-a-repo")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid URL format"));
}

#[test]
fn test_cli_rejects_empty_search() {
    cli()
        .arg("search")
        .arg("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please enter a search term"));
}

#[test]
fn test_cli_rejects_unknown_format() {
    cli()
        .args(["search", "rust", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown format"));
}

#[test]
fn test_cli_missing_config_file() {
    cli()
        .args(["--config", "/nonexistent/repo-insight.toml", "profile", "octo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn test_cli_profile_json() {
    let mut server = mockito::Server::new();
    let _user = server
        .mock("GET", "/users/octo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"login": "octo", "name": "Octo Cat", "bio": null, "avatar_url": "", "public_repos": 1,
                "followers": 2500, "following": 3, "html_url": "https://github.com/octo",
                "created_at": "2011-01-25T18:44:36Z"}"#,
        )
        .create();
    let _repos = server
        .mock("GET", "/users/octo/repos")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[{"name": "tool", "stargazers_count": 42, "description": "A tool",
                 "language": "Rust", "html_url": "https://github.com/octo/tool"}]"#,
        )
        .create();
    let config = config_for(&server.url());

    cli()
        .arg("--config")
        .arg(config.path())
        .args(["profile", "octo", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"username\": \"octo\""))
        .stdout(predicate::str::contains("\"followers\": \"2.5K\""))
        .stdout(predicate::str::contains("\"name\": \"Rust\""));
}

#[test]
fn test_cli_repository_not_found() {
    let mut server = mockito::Server::new();
    let _repo = server
        .mock("GET", "/repos/acme/missing")
        .with_status(404)
        .with_body(r#"{"message": "Not Found"}"#)
        .create();
    let config = config_for(&server.url());

    cli()
        .arg("--config")
        .arg(config.path())
        .args(["analyze", "https://github.com/acme/missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Repository not found or private"));
}

#[test]
fn test_cli_search_markdown_to_file() {
    let mut server = mockito::Server::new();
    let _search = server
        .mock("GET", "/search/repositories")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"total_count": 1, "items": [{"full_name": "org/lib", "html_url": "https://github.com/org/lib",
                "stargazers_count": 1500, "description": "Library", "language": "Go",
                "updated_at": "2024-02-03T04:05:06Z", "owner": {"avatar_url": "https://a.example/org"}}]}"#,
        )
        .create();
    let config = config_for(&server.url());
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("search.md");

    cli()
        .arg("--config")
        .arg(config.path())
        .args(["search", "lib", "--format", "markdown", "--output"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let written = std::fs::read_to_string(&output).unwrap();
    assert!(written.contains("# Search: lib"));
    assert!(written
        .contains("| [org/lib](https://github.com/org/lib) | 1.5K | Go | 2024-02-03 | Library |"));
}
