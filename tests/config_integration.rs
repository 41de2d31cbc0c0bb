use textedit::config::{
    ConfigFlags, Indent, load_config_flags, parse_flag_tokens, save_config_flags,
};

#[test]
fn test_config_file_parsing_ignores_comments_and_blank_lines() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".texteditrc");
    let content = r"
# comment
--comment-marker #

--indent 4
   
--history-depth=50
";
    std::fs::write(&path, content).unwrap();

    let flags = load_config_flags(&path).unwrap();
    assert_eq!(flags.comment_marker.as_deref(), Some("#"));
    assert_eq!(flags.indent, Some(Indent::Spaces(4)));
    assert_eq!(flags.history_depth, Some(50));
}

#[test]
fn test_cli_flags_override_file_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".texteditrc");
    std::fs::write(&path, "--comment-marker ;;\n--indent tab\n--log warn\n").unwrap();

    let file_flags = load_config_flags(&path).unwrap();
    let cli_args = vec![
        "textedit".to_string(),
        "--indent".to_string(),
        "2".to_string(),
        "--history-depth".to_string(),
        "8".to_string(),
    ];
    let cli_flags = parse_flag_tokens(&cli_args);

    let effective = file_flags.union(&cli_flags);
    assert_eq!(
        effective.comment_marker.as_deref(),
        Some(";;"),
        "file config should be preserved when CLI does not override"
    );
    assert_eq!(effective.indent, Some(Indent::Spaces(2)), "cli should override indent");
    assert_eq!(effective.history_depth, Some(8), "cli flags should be applied");
    assert_eq!(effective.log_filter.as_deref(), Some("warn"));

    let config = effective.resolve();
    assert_eq!(config.comment_marker, ";;");
    assert_eq!(config.indent, "  ");
    assert_eq!(config.history_depth, 8);
}

#[test]
fn test_missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let flags = load_config_flags(&dir.path().join("absent")).unwrap();
    assert_eq!(flags, ConfigFlags::default());
}

#[test]
fn test_saved_config_is_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config");
    let flags = ConfigFlags {
        comment_marker: Some("--".to_string()),
        indent: Some(Indent::Tab),
        ..ConfigFlags::default()
    };
    save_config_flags(&path, &flags).unwrap();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with('#'));
    assert_eq!(load_config_flags(&path).unwrap(), flags);
}
