use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<script type="text/x-template" id="item" data-tag-name="li" data-class-name="item" data-attributes='{"lang":"en"}'><span>{{ name }}</span></script>
<script type="text/x-template" id="plain"><p>plain</p></script>
</head>
<body></body>
</html>"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("page.html"), PAGE).unwrap();
        Self { dir }
    }

    fn page(&self) -> PathBuf {
        self.dir.path().join("page.html")
    }

    fn config_dir(&self) -> PathBuf {
        self.dir.path().join("config")
    }

    fn write_config(&self, json: &str) {
        let dir = self.config_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("declarative-views.json"), json).unwrap();
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("dviews").unwrap();
        cmd.env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .arg("--config")
            .arg(self.config_dir());
        cmd
    }
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_element_from_declarative_template() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["element", path_arg(&ws.page()), "#item"])
        .assert()
        .success()
        .stdout(predicate::eq("<li class=\"item\" lang=\"en\">\n"));
}

#[test]
fn test_element_options_take_precedence() {
    let ws = Workspace::new();
    ws.cmd()
        .args([
            "element",
            path_arg(&ws.page()),
            "#item",
            "--class-name",
            "wide",
            "--id",
            "first",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<li class=\"wide\" id=\"first\" lang=\"en\">",
        ));
}

#[test]
fn test_element_from_raw_markup() {
    let ws = Workspace::new();
    ws.cmd()
        .args([
            "element",
            path_arg(&ws.page()),
            r#"<!-- data-tag-name="ul" data-class-name="menu" --><li>x</li>"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("<ul class=\"menu\">"));
}

#[test]
fn test_missing_template_falls_back_to_div() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["element", path_arg(&ws.page()), "#doesNotExist"])
        .assert()
        .success()
        .stdout(predicate::eq("<div>\n"))
        .stderr(predicate::str::contains("No template found"));
}

#[test]
fn test_inspect_prints_entries() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["inspect", path_arg(&ws.page()), "#item", "#plain", "#nope"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""tagName": "li""#))
        .stdout(predicate::str::contains(r#""html": "<p>plain</p>""#))
        .stdout(predicate::str::contains(r#""entry": null"#));
}

#[test]
fn test_render_with_data() {
    let ws = Workspace::new();
    ws.cmd()
        .args([
            "render",
            path_arg(&ws.page()),
            "#item",
            "--data",
            r#"{"name":"Ada"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<li class=\"item\" lang=\"en\"><span>Ada</span></li>",
        ));
}

#[test]
fn test_render_missing_template_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["render", path_arg(&ws.page()), "#nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains("#nope")));
}

#[test]
fn test_attrs_lists_defaults_and_configured() {
    let ws = Workspace::new();
    ws.cmd()
        .arg("attrs")
        .assert()
        .success()
        .stdout(predicate::str::contains("data-tag-name"))
        .stdout(predicate::str::contains("data-attributes"))
        .stdout(predicate::str::contains("data-role").not());

    ws.write_config(r#"{"data_attributes": [{"name": "role"}, {"name": "viewConfig", "json": true}]}"#);
    ws.cmd()
        .arg("attrs")
        .assert()
        .success()
        .stdout(predicate::str::contains("data-role"))
        .stdout(predicate::str::contains("data-view-config"));
}

#[test]
fn test_invalid_config_attribute_fails() {
    let ws = Workspace::new();
    ws.write_config(r#"{"data_attributes": [{"name": "html"}]}"#);
    ws.cmd()
        .arg("attrs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));
}

#[test]
fn test_missing_file_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["element", "does-not-exist.html", "#item"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error:"));
}
