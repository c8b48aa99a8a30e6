use super::args::CliArgs;
use super::config::{
    CONFIG_FILE_NAME, DeclgraphConfig, find_config, load_config, parse_config, resolve_options,
};
use declgraph_composer::ComposerOptions;
use std::path::{Path, PathBuf};

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write test file");
    path
}

#[test]
fn test_parse_boolean_strings() {
    let config = parse_config(
        r#"{ "pretty": "yes", "failOnWarnings": false,
             "composerOptions": { "serial": "true", "stripGenericArgumentsForInheritance": "off" } }"#,
    )
    .unwrap();

    assert_eq!(config.pretty, Some(true));
    assert_eq!(config.fail_on_warnings, Some(false));
    let composer = config.composer_options.unwrap();
    assert_eq!(composer.serial, Some(true));
    assert_eq!(composer.strip_generic_arguments_for_inheritance, Some(false));
}

#[test]
fn test_parse_invalid_boolean_string() {
    let err = parse_config(r#"{ "pretty": "sometimes" }"#).unwrap_err();
    assert!(format!("{err:#}").contains("invalid boolean value"));
}

#[test]
fn test_empty_config_keeps_defaults() {
    let config = parse_config("{}").unwrap();
    let resolved = resolve_options(
        &CliArgs::default(),
        Some(&config),
        Path::new("/project"),
        Path::new("/cwd"),
    );

    assert_eq!(resolved.composer, ComposerOptions::default());
    assert!(resolved.inputs.is_empty());
    assert_eq!(resolved.out, None);
    assert!(!resolved.pretty);
}

#[test]
fn test_config_paths_resolve_against_config_dir() {
    let config = DeclgraphConfig {
        inputs: Some(vec!["parsed".into()]),
        out: Some("build/model.json".into()),
        ..DeclgraphConfig::default()
    };
    let resolved = resolve_options(
        &CliArgs::default(),
        Some(&config),
        Path::new("/project"),
        Path::new("/cwd"),
    );

    assert_eq!(resolved.inputs, vec![PathBuf::from("/project/parsed")]);
    assert_eq!(resolved.out, Some(PathBuf::from("/project/build/model.json")));
}

#[test]
fn test_flags_override_config() {
    let config = parse_config(
        r#"{ "inputs": ["parsed"], "out": "model.json",
             "composerOptions": { "maxAliasDepth": 4 } }"#,
    )
    .unwrap();
    let args = CliArgs {
        inputs: vec!["other".into()],
        out: Some("elsewhere.json".into()),
        serial: true,
        ..CliArgs::default()
    };
    let resolved = resolve_options(&args, Some(&config), Path::new("/project"), Path::new("/cwd"));

    assert_eq!(resolved.inputs, vec![PathBuf::from("/cwd/other")]);
    assert_eq!(resolved.out, Some(PathBuf::from("/cwd/elsewhere.json")));
    assert!(resolved.composer.serial);
    assert_eq!(resolved.composer.max_alias_depth, 4);
}

#[test]
fn test_find_config_in_cwd_and_directory() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(find_config(None, dir.path()).unwrap(), None);

    let path = write_file(dir.path(), CONFIG_FILE_NAME, r#"{ "pretty": true }"#);
    assert_eq!(find_config(None, dir.path()).unwrap(), Some(path.clone()));
    assert_eq!(
        find_config(Some(dir.path()), Path::new("/")).unwrap(),
        Some(path.clone())
    );
    assert_eq!(load_config(&path).unwrap().pretty, Some(true));
}

#[test]
fn test_find_config_missing_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = find_config(Some(Path::new("missing.json")), dir.path()).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}
