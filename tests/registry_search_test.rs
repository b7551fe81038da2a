//! End-to-end search across mocked registries

#![allow(clippy::unwrap_used, clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WIKI_LISTING: &str = r#"
<html><body>
  <div class="markdown-body">
    <h2>String manipulation</h2>
    <ul>
      <li><a href="https://github.com/clibs/buffer">clibs/buffer</a> - Tiny C string library</li>
    </ul>
    <h2>Data structures</h2>
    <ul>
      <li><a href="https://github.com/clibs/list">clibs/list</a> - Doubly linked list</li>
    </ul>
  </div>
</body></html>
"#;

const GITLAB_README: &str = "\
# Internal

- [team/buffer](https://gitlab.example.com/team/buffer) - Patched buffer fork
- [team/logger](https://gitlab.example.com/team/logger) - Structured logging
";

async fn mount_wiki(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/github.com/clibs/clib/wiki/Packages"))
        .respond_with(ResponseTemplate::new(200).set_body_string(WIKI_LISTING))
        .mount(server)
        .await;
}

async fn mount_gitlab(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v4/projects/.+/repository/files/README\.md/raw$"))
        .and(query_param("ref", "master"))
        .and(header("PRIVATE-TOKEN", token))
        .respond_with(ResponseTemplate::new(200).set_body_string(GITLAB_README))
        .mount(server)
        .await;
}

/// Config pointing the default listing at the mock server, plus a secrets file
fn write_config(dir: &TempDir, server: &MockServer, registries: &[String]) -> std::path::PathBuf {
    let secrets = dir.path().join("secrets.json");
    std::fs::write(&secrets, r#"{ "127.0.0.1": "glpat-test" }"#).unwrap();

    let config = dir.path().join("clib.toml");
    let registries = registries
        .iter()
        .map(|r| format!("{:?}", r))
        .collect::<Vec<_>>()
        .join(", ");
    std::fs::write(
        &config,
        format!(
            "registries = [{}]\ndefault_registry = \"{}/github.com/clibs/clib/wiki/Packages\"\nsecrets_file = {:?}\nhttp_timeout_secs = 5\n",
            registries,
            server.uri(),
            secrets.display().to_string()
        ),
    )
    .unwrap();
    config
}

fn clib_cmd(dir: &TempDir, config: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("clib").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_lists_every_registry_in_priority_order() {
    let server = MockServer::start().await;
    mount_wiki(&server).await;
    mount_gitlab(&server, "glpat-test").await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[format!("{}/gitlab/registry", server.uri())]);

    let output = clib_cmd(&dir, &config)
        .args(["search", "buffer"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let team = stdout.find("team/buffer").expect("gitlab result");
    let clibs = stdout.find("clibs/buffer").expect("wiki result");
    assert!(team < clibs);
    assert!(stdout.contains("String manipulation"));
    assert!(!stdout.contains("clibs/list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_id_prefers_first_registry() {
    let server = MockServer::start().await;
    mount_wiki(&server).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[]);

    clib_cmd(&dir, &config)
        .args(["search", "--id", "clibs/list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/github.com/clibs/clib/wiki/Packages"))
        .stdout(predicate::str::contains("https://github.com/clibs/list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failing_registry_does_not_hide_the_default() {
    let server = MockServer::start().await;
    mount_wiki(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/v4/projects/.+/repository/files/README\.md/raw$"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[format!("{}/gitlab/private", server.uri())]);

    clib_cmd(&dir, &config)
        .args(["search", "--json", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"id\": \"clibs/list\""))
        .stderr(predicate::str::contains("gitlab/private"))
        .stderr(predicate::str::contains("[WARNING] 1 of 2 registries"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_registry_is_skipped_with_warning() {
    let server = MockServer::start().await;
    mount_wiki(&server).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[]);

    clib_cmd(&dir, &config)
        .args(["--registry", "https://example.com/listing", "search", "--id", "clibs/buffer"])
        .assert()
        .success()
        .stderr(predicate::str::contains("example.com/listing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_id_absent_exits_one() {
    let server = MockServer::start().await;
    mount_wiki(&server).await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[]);

    clib_cmd(&dir, &config)
        .args(["search", "--id", "nobody/nothing"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("nobody/nothing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_all_registries_failing_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = write_config(&dir, &server, &[]);

    clib_cmd(&dir, &config)
        .args(["search", "buffer"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No registry could be listed"));
}
