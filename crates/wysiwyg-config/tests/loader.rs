use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use wysiwyg_config::{Config, ConfigError, ConfigSourceKind, LoadOptions};
use wysiwyg_core::{Command, PreviewMode};

fn write_file(path: impl AsRef<Path>, contents: &str) {
    let mut file = fs::File::create(path).expect("create config");
    file.write_all(contents.as_bytes()).expect("write config");
}

fn canonical(path: impl AsRef<Path>) -> PathBuf {
    fs::canonicalize(path).expect("canonicalize path")
}

#[test]
fn loads_defaults_when_no_files_present() {
    let temp = TempDir::new().expect("tempdir");
    let working_dir = canonical(temp.path());

    let config = Config::load(LoadOptions::default().with_working_dir(working_dir.clone()))
        .expect("load defaults");

    assert_eq!(config.toolbar.buttons, Command::ALL.to_vec());
    assert!(config.autosave.enabled);
    assert_eq!(config.autosave.interval, Duration::from_millis(300_000));
    assert_eq!(config.storage.key, "wysiwygContent");
    assert_eq!(config.storage.dir, working_dir.join(".wysiwyg"));
    assert_eq!(config.preview.mode, PreviewMode::Raw);
    assert_eq!(config.link.default, "https://");

    assert_eq!(config.sources.layers.len(), 1);
    assert_eq!(config.sources.layers[0].kind, ConfigSourceKind::Default);
}

#[test]
fn applies_precedence_and_merges_fields() {
    let temp = TempDir::new().expect("tempdir");
    let git_root = canonical(temp.path());
    fs::create_dir(git_root.join(".git")).expect("create .git");

    write_file(
        git_root.join(".wysiwyg.toml"),
        r#"
        [toolbar]
        buttons = ["bold", "italic", "link"]

        [autosave]
        interval_ms = 1000

        [storage]
        dir = "root-state"
        "#,
    );

    let nested = git_root.join("docs");
    fs::create_dir(&nested).expect("create nested");
    write_file(
        nested.join(".wysiwyg.toml"),
        r#"
        [autosave]
        enabled = false

        [preview]
        mode = "escaped"
        "#,
    );

    let override_path = git_root.join("override.toml");
    write_file(
        &override_path,
        r#"
        [storage]
        key = "draft"
        "#,
    );

    let config = Config::load(
        LoadOptions::default()
            .with_working_dir(&nested)
            .with_override_path(&override_path),
    )
    .expect("load layered");

    assert_eq!(
        config.toolbar.buttons,
        vec![Command::Bold, Command::Italic, Command::Link]
    );
    assert!(!config.autosave.enabled);
    assert_eq!(config.autosave.interval, Duration::from_millis(1000));
    assert_eq!(config.storage.dir, git_root.join("root-state"));
    assert_eq!(config.storage.key, "draft");
    assert_eq!(config.preview.mode, PreviewMode::Escaped);

    let kinds: Vec<_> = config.sources.layers.iter().map(|l| l.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ConfigSourceKind::Default,
            ConfigSourceKind::GitRoot,
            ConfigSourceKind::Local,
            ConfigSourceKind::Override,
        ]
    );

    let options = config.editor_options();
    assert_eq!(options.storage_key, "draft");
    assert_eq!(options.toolbar.buttons().len(), 3);
}

#[test]
fn unknown_button_fails_fast() {
    let temp = TempDir::new().expect("tempdir");
    let dir = canonical(temp.path());
    write_file(
        dir.join(".wysiwyg.toml"),
        r#"
        [toolbar]
        buttons = ["bold", "underline"]
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&dir)).unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            let message = errors.to_string();
            assert!(message.contains("toolbar.buttons"));
            assert!(message.contains("unknown button 'underline'"));
            assert!(message.contains("local config"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn collects_every_validation_failure() {
    let temp = TempDir::new().expect("tempdir");
    let dir = canonical(temp.path());
    write_file(
        dir.join(".wysiwyg.toml"),
        r#"
        [autosave]
        interval_ms = 0

        [storage]
        key = "  "

        [preview]
        mode = "sanitized"
        "#,
    );

    let err = Config::load(LoadOptions::default().with_working_dir(&dir)).unwrap_err();
    let ConfigError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.iter().count(), 3);
}

#[test]
fn missing_override_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let dir = canonical(temp.path());

    let err = Config::load(
        LoadOptions::default()
            .with_working_dir(&dir)
            .with_override_path("missing.toml"),
    )
    .unwrap_err();

    assert!(matches!(err, ConfigError::OverrideNotFound { .. }));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let temp = TempDir::new().expect("tempdir");
    let dir = canonical(temp.path());
    write_file(dir.join(".wysiwyg.toml"), "[toolbar\nbuttons = 1");

    let err = Config::load(LoadOptions::default().with_working_dir(&dir)).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn path_like_storage_keys_fail_validation() {
    for key in ["a/b", "x\\\\y", ".hidden", ".."] {
        let temp = TempDir::new().expect("tempdir");
        let dir = canonical(temp.path());
        write_file(
            dir.join(".wysiwyg.toml"),
            &format!("[storage]\nkey = \"{key}\"\n"),
        );

        let err = Config::load(LoadOptions::default().with_working_dir(&dir)).unwrap_err();
        let ConfigError::Validation(errors) = err else {
            panic!("expected validation error for key {key:?}");
        };
        let message = errors.to_string();
        assert!(message.contains("storage.key"), "{message}");
        assert!(message.contains("local config"), "{message}");
    }
}
