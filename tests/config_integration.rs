use std::path::PathBuf;
use std::time::Duration;

use quillpost::config::{
    ConfigFlags, DEFAULT_SERVER, ThemeMode, load_config_flags, parse_flag_tokens,
    save_config_flags,
};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".quillpostrc");
    let content = r#"
# comment
--server https://api.example.com

--theme light

--export-dir=out
"#;
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags.server.as_deref(), Some("https://api.example.com"));
    assert_eq!(flags.theme, Some(ThemeMode::Light));
    assert_eq!(flags.export_dir, Some(PathBuf::from("out")));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".quillpostrc");
    let content = "--server http://a.test\n--theme light\n--timeout 5\n";
    std::fs::write(&path, content).unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "quillpost".to_string(),
        "--theme".to_string(),
        "dark".to_string(),
        "--min-pane-width".to_string(),
        "30".to_string(),
        "draft.md".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert_eq!(effective.server(), "http://a.test", "file flags should remain");
    assert_eq!(effective.min_pane_width, Some(30), "cli flags should be applied");
    assert_eq!(effective.theme, Some(ThemeMode::Dark), "cli should override theme");
    assert_eq!(
        effective.timeout(),
        Duration::from_secs(5),
        "file config should be preserved when CLI does not override"
    );
}

#[test]
fn test_saved_flags_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config");
    let flags = ConfigFlags {
        server: Some("http://saved.test".to_string()),
        min_pane_width: Some(25),
        timeout_secs: Some(12),
        theme: Some(ThemeMode::Auto),
        ..ConfigFlags::default()
    };
    save_config_flags(&path, &flags).unwrap();

    let loaded = load_config_flags(&path).unwrap();
    assert_eq!(loaded, flags);
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
    assert_eq!(flags.server(), DEFAULT_SERVER);
}
