//! Integration tests for Settings config loading with layered merge semantics.
//!
//! Merge Semantics:
//! - Defaults → Global: REPLACE (global defines the real baseline)
//! - Global → Local: UNION with negation support (local adds project-specific tokens)
//! - Any → Env vars: REPLACE (explicit user override)
//!
//! These tests pass an explicit global config path, so the user's real
//! configuration never leaks in.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use taxnav::application::ApplicationError;
use taxnav::config::{local_config_path, Settings};

fn write_global(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("taxnav.toml");
    fs::write(&path, content).expect("write global config");
    path
}

fn write_local(dir: &TempDir, content: &str) {
    fs::write(local_config_path(dir.path()), content).expect("write local config");
}

#[test]
fn given_no_config_files_when_loading_then_compiled_defaults() {
    // Arrange
    let global = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    // Act
    let settings =
        Settings::load_layers(Some(&global.path().join("missing.toml")), Some(project.path()))
            .expect("load settings");

    // Assert
    assert_eq!(settings.server.bind, "127.0.0.1:8787");
    assert!(settings.server.editor_tokens.is_empty());
    assert_eq!(settings.permalink_bases.get("post_tag").map(String::as_str), Some("tag"));
}

#[test]
fn given_global_tokens_when_loading_then_replace_defaults() {
    // Arrange
    let global = TempDir::new().unwrap();
    let path = write_global(
        &global,
        r#"
site_url = "https://example.com"

[permalink_bases]
genre = "genres"

[server]
editor_tokens = ["alice", "bob"]
"#,
    );

    // Act
    let settings = Settings::load_layers(Some(&path), None).expect("load settings");

    // Assert
    assert_eq!(settings.site_url, "https://example.com");
    assert_eq!(settings.server.editor_tokens, vec!["alice", "bob"]);
    // Maps replace too: the default bases are gone
    assert_eq!(settings.permalink_bases.len(), 1);
    assert_eq!(settings.permalink_bases["genre"], "genres");
}

#[test]
fn given_local_tokens_with_negation_when_loading_then_union_minus_negated() {
    // Arrange
    let global = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let path = write_global(&global, "[server]\neditor_tokens = [\"alice\", \"bob\"]\n");
    write_local(&project, "[server]\neditor_tokens = [\"!bob\", \"carol\"]\n");

    // Act
    let settings = Settings::load_layers(Some(&path), Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings.server.editor_tokens, vec!["alice", "carol"]);
}

#[test]
fn given_local_scalars_when_loading_then_local_wins_over_global() {
    // Arrange
    let global = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let path = write_global(
        &global,
        "site_url = \"https://global.example\"\n[server]\nbind = \"0.0.0.0:80\"\n",
    );
    write_local(
        &project,
        "site_url = \"https://local.example\"\n[permalink_bases]\ncategory = \"topics\"\n",
    );

    // Act
    let settings = Settings::load_layers(Some(&path), Some(project.path())).expect("load settings");

    // Assert
    assert_eq!(settings.site_url, "https://local.example");
    assert_eq!(settings.server.bind, "0.0.0.0:80");
    assert_eq!(settings.permalink_bases["category"], "topics");
    assert_eq!(settings.permalink_bases["post_tag"], "tag");
}

#[test]
fn given_invalid_toml_when_loading_then_config_error() {
    let project = TempDir::new().unwrap();
    write_local(&project, "site_url = [unclosed");

    let result = Settings::load_layers(None, Some(project.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips() {
    let settings = Settings::default();

    let rendered = settings.to_toml().expect("serialize");
    let parsed: Settings = toml::from_str(&rendered).expect("parse");

    assert_eq!(parsed, settings);
}

#[test]
fn given_template_when_parsed_then_valid_toml() {
    let template = Settings::template();
    assert!(toml::from_str::<toml::Value>(&template).is_ok());
}
