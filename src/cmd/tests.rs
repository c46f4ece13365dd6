// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::crypto::decrypt_values;
use super::list::{ListEntry, list_entries};
use super::render::{load_cipher, load_mapping, render};
use crate::config::Config;
use crate::crypto::key::EncryptionKey;
use std::path::Path;
use tempfile::TempDir;

/// Config rooted in `dir` whose key variable is never set.
fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.render.templates = dir.join("templates");
    config.render.output = dir.join("output");
    config.render.env_files = vec![dir.join(".env"), dir.join(".env.local")];
    config.crypto.key_env = "RCFG_TEST_KEY_NEVER_SET".to_string();
    config
}

fn write(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn setup() -> (TempDir, Config) {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    (dir, config)
}

#[test]
fn test_load_mapping_later_file_wins() {
    let (dir, config) = setup();
    write(&dir.path().join(".env"), "PORT=8080\nHOST=localhost\n");
    write(&dir.path().join(".env.local"), "PORT=9090\n");

    let mapping = load_mapping(&config).unwrap();
    assert_eq!(mapping.get("PORT"), Some("9090"));
    assert_eq!(mapping.get("HOST"), Some("localhost"));
    assert_eq!(mapping.sources().len(), 2);
}

#[test]
fn test_load_mapping_parse_error_has_context() {
    let (dir, config) = setup();
    write(&dir.path().join(".env"), "NOT A VALID LINE\n");

    let err = load_mapping(&config).unwrap_err();
    assert_eq!(err.to_string(), "failed to load env files");
    assert!(format!("{err:#}").contains(".env"));
}

#[test]
fn test_load_cipher_absent_and_from_file() {
    let (dir, mut config) = setup();
    assert!(load_cipher(&config).unwrap().is_none());

    let key = EncryptionKey::generate();
    let key_path = dir.path().join("render.key");
    write(&key_path, &format!("{}\n", key.to_base64()));
    config.crypto.key_file = Some(key_path);

    let cipher = load_cipher(&config).unwrap().unwrap();
    let ciphertext = cipher.encrypt("hunter2").unwrap();
    assert_eq!(cipher.decrypt(&ciphertext).unwrap(), "hunter2");
}

#[test]
fn test_load_cipher_missing_key_file_fails() {
    let (dir, mut config) = setup();
    config.crypto.key_file = Some(dir.path().join("absent.key"));
    assert!(load_cipher(&config).is_err());
}

#[test]
fn test_render_writes_tree() {
    let (dir, config) = setup();
    write(&dir.path().join(".env"), "HOST=localhost\n");
    write(
        &dir.path().join("templates/a/b.conf.tmpl"),
        "HOST={{ .HOST }}\n",
    );

    let summary = render(&config, false).unwrap();
    assert_eq!(summary.written().len(), 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("output/a/b.conf")).unwrap(),
        "HOST=localhost\n"
    );
}

#[test]
fn test_render_missing_template_dir() {
    let (_dir, config) = setup();
    let err = render(&config, false).unwrap_err();
    assert!(err.to_string().contains("template directory not found"), "{err}");
}

#[test]
fn test_list_entries() {
    let (dir, config) = setup();
    write(&dir.path().join("templates/app.env.tpl"), "");
    write(&dir.path().join("templates/nginx/site.conf.tmpl"), "");

    let entries = list_entries(&config).unwrap();
    let templates = dir.path().join("templates");
    let output = dir.path().join("output");
    assert_eq!(
        entries,
        [
            ListEntry {
                template: templates.join("app.env.tpl").display().to_string(),
                output: output.join("app.env").display().to_string(),
            },
            ListEntry {
                template: templates.join("nginx/site.conf.tmpl").display().to_string(),
                output: output.join("nginx/site.conf").display().to_string(),
            },
        ]
    );
    assert!(!output.exists());
}

#[test]
fn test_decrypt_values_reports_position() {
    let cipher = crate::crypto::Cipher::new(&EncryptionKey::generate());
    let good = cipher.encrypt("one").unwrap();

    let plain = decrypt_values(&cipher, std::slice::from_ref(&good)).unwrap();
    assert_eq!(plain, ["one"]);

    let err = decrypt_values(&cipher, &[good, "garbage!".to_string()]).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"failed to decrypt value #2");
}
