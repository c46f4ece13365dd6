// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tests for the env module.

use super::{EnvMapping, load_env_files, load_env_files_into};
use crate::error::EnvError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_later_file_overrides_earlier() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(&dir, ".env", "PORT=8080\nHOST=localhost\n");
    let local = write(&dir, ".env.local", "PORT=9090\n");

    let env = load_env_files(&[base, local]).unwrap();

    assert_eq!(env.get("PORT"), Some("9090"));
    assert_eq!(env.get("HOST"), Some("localhost"));
    assert_eq!(env.sources().len(), 2);
}

#[test]
fn test_missing_file_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let present = write(&dir, ".env", "A=1\n");
    let missing = dir.path().join(".env.missing");

    let env = load_env_files(&[missing, present.clone()]).unwrap();

    assert_eq!(env.get("A"), Some("1"));
    assert_eq!(env.sources(), [present.as_path()]);
}

#[test]
fn test_all_files_missing_yields_empty_mapping() {
    let env = load_env_files(&[Path::new("/nonexistent/render-cfg/.env")]).unwrap();
    assert!(env.is_empty());
    assert!(env.sources().is_empty());
}

#[test]
fn test_last_line_wins_within_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, ".env", "KEY=first\nKEY=second\n");

    let env = load_env_files(&[path]).unwrap();
    assert_eq!(env.get("KEY"), Some("second"));
}

#[test]
fn test_dotenv_syntax() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        &dir,
        ".env",
        "# comment\nexport RCFG_APP=app\nQUOTED=\"hello world\"\nEMPTY=\nURL=http://${RCFG_APP}.local\n",
    );

    let env = load_env_files(&[path]).unwrap();

    assert_eq!(env.get("RCFG_APP"), Some("app"));
    assert_eq!(env.get("QUOTED"), Some("hello world"));
    assert_eq!(env.get("EMPTY"), Some(""));
    assert_eq!(env.get("URL"), Some("http://app.local"));
    assert!(env.contains_key("EMPTY"));
}

#[test]
fn test_keys_are_case_sensitive() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, ".env", "key=lower\nKEY=upper\n");

    let env = load_env_files(&[path]).unwrap();
    assert_eq!(env.get("key"), Some("lower"));
    assert_eq!(env.get("KEY"), Some("upper"));
}

#[test]
fn test_parse_error_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let good = write(&dir, ".env", "A=1\n");
    let bad = write(&dir, ".env.bad", "THIS LINE IS NOT VALID\n");

    let err = load_env_files(&[good, bad]).unwrap_err();
    assert!(matches!(err, EnvError::Parse { .. }), "{err:?}");
}

#[test]
fn test_directory_as_env_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_env_files(&[dir.path()]).unwrap_err();
    assert!(matches!(err, EnvError::Read { .. }), "{err:?}");
}

#[test]
fn test_files_layer_over_base_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, ".env", "SHARED=file\n");

    let base: EnvMapping = [("SHARED", "process"), ("ONLY_BASE", "yes")]
        .into_iter()
        .collect();
    let env = load_env_files_into(base, &[path]).unwrap();

    assert_eq!(env.get("SHARED"), Some("file"));
    assert_eq!(env.get("ONLY_BASE"), Some("yes"));
}

#[test]
fn test_mapping_iteration_is_sorted() {
    let env: EnvMapping = [("B", "2"), ("A", "1"), ("C", "3")].into_iter().collect();
    let keys: Vec<_> = env.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["A", "B", "C"]);
}

// =============================================================================
// Parsing and expansion
// =============================================================================

#[test]
fn test_file_value_shadows_process_env_in_expansion() {
    // HOME is set for any test process; the file's own value must win.
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, ".env", "HOME=/from-file\nDATA=${HOME}/data\n");

    let env = load_env_files(&[path]).unwrap();
    assert_eq!(env.get("DATA"), Some("/from-file/data"));
}

#[test]
fn test_expansion_ignores_process_env_unless_seeded() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, ".env", "CACHE=${PATH}|$PATH\n");

    let env = load_env_files(&[path.clone()]).unwrap();
    assert_eq!(env.get("CACHE"), Some("|"));

    let seeded = load_env_files_into(EnvMapping::with_process_env(), &[path]).unwrap();
    let path_var = std::env::var("PATH").unwrap();
    assert_eq!(seeded.get("CACHE"), Some(format!("{path_var}|{path_var}").as_str()));
}

#[test]
fn test_expansion_sees_earlier_files() {
    let dir = tempfile::tempdir().unwrap();
    let base = write(&dir, ".env", "ROOT=/srv\n");
    let local = write(&dir, ".env.local", "LOGS=${ROOT}/logs\nROOT=/opt\nBIN=$ROOT/bin\n");

    let env = load_env_files(&[base, local]).unwrap();
    assert_eq!(env.get("LOGS"), Some("/srv/logs"));
    assert_eq!(env.get("BIN"), Some("/opt/bin"));
}

#[test]
fn test_quoting_rules() {
    let base = EnvMapping::new();
    let pairs = super::parse::parse(
        "A=x\nSINGLE='${A} \\n'\nDOUBLE=\"${A}\\t\\\"q\\\" \\$A\"\nMULTI=\"one\ntwo\"\nBARE=  v # trailing\nHASH=a#b\n",
        &base,
    )
    .unwrap();

    insta::assert_debug_snapshot!(pairs, @r#"
    [
        (
            "A",
            "x",
        ),
        (
            "SINGLE",
            "${A} \\n",
        ),
        (
            "DOUBLE",
            "x\t\"q\" $A",
        ),
        (
            "MULTI",
            "one\ntwo",
        ),
        (
            "BARE",
            "v",
        ),
        (
            "HASH",
            "a#b",
        ),
    ]
    "#);
}

#[test]
fn test_parse_errors_name_the_line() {
    let base = EnvMapping::new();
    let parse = |src: &str| super::parse::parse(src, &base).unwrap_err().to_string();

    insta::assert_snapshot!(parse("A=1\n\nB 2\n"), @"line 3: expected '=' after 'B'");
    insta::assert_snapshot!(parse("=oops\n"), @"line 1: missing variable name");
    insta::assert_snapshot!(parse("A='open\n"), @"line 1: unterminated single-quoted value");
    insta::assert_snapshot!(parse("A=\"x\" y\n"), @"line 1: unexpected characters after quoted value");
    insta::assert_snapshot!(parse("A=${B\n"), @"line 1: unterminated '${' reference");
}
