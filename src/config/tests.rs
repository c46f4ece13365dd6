// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{Config, ConfigLoader, ENV_PREFIX};
use crate::crypto::key::KeySource;
use crate::template::TemplateSyntax;
use std::path::{Path, PathBuf};

#[test]
fn test_default_config() {
    let config = Config::default();
    insta::assert_snapshot!(config.format_options().join("\n"), @r"
    crypto.key_env           = RENDER_KEY
    render.encrypt_suffixes  = [PASSWORD, SECRET, KEY]
    render.env_files         = [.env]
    render.exclude           = []
    render.extensions        = [tmpl, tpl]
    render.follow_links      = false
    render.include_hidden    = true
    render.output            = ./output
    render.process_env       = false
    render.respect_gitignore = false
    render.strict            = false
    render.syntax            = go
    render.templates         = ./templates
    ");
    config.validate().unwrap();
}

#[test]
fn test_parse_partial_sections() {
    let config = Config::parse(
        r#"
        [render]
        templates = "deploy/templates"
        env_files = [".env", ".env.prod"]
        strict = true

        [crypto]
        key_file = "secrets/render.key"
        "#,
    )
    .unwrap();

    assert_eq!(config.render.templates, Path::new("deploy/templates"));
    assert_eq!(config.render.output, Path::new("./output"));
    assert_eq!(
        config.render.env_files,
        [PathBuf::from(".env"), PathBuf::from(".env.prod")]
    );
    assert!(config.render.strict);
    assert_eq!(config.crypto.key_env, "RENDER_KEY");
    assert_eq!(
        config.crypto.key_file.as_deref(),
        Some(Path::new("secrets/render.key"))
    );
}

#[test]
fn test_unknown_field_rejected() {
    let err = Config::parse("[render]\nstrictt = true\n").unwrap_err();
    assert!(err.to_string().contains("strictt"), "{err}");

    assert!(Config::parse("[paths]\nprefix = \"x\"\n").is_err());
}

#[test]
fn test_syntax_setting() {
    let config = Config::parse("[render]\nsyntax = \"jinja\"\n").unwrap();
    assert_eq!(config.render.syntax, TemplateSyntax::Jinja);
    assert_eq!(config.to_render_config(false).syntax(), TemplateSyntax::Jinja);

    assert!(Config::parse("[render]\nsyntax = \"erb\"\n").is_err());
}

#[test]
fn test_env_var_turns_strict_off_again() {
    let config = ConfigLoader::new()
        .add_toml_str("[render]\nstrict = true\n")
        .with_env_prefix(ENV_PREFIX)
        .with_env_vars([("RENDER_CFG_RENDER__STRICT", "false")])
        .set("render.syntax", "jinja")
        .unwrap()
        .build()
        .unwrap();
    assert!(!config.render.strict);
    assert_eq!(config.render.syntax, TemplateSyntax::Jinja);
}

#[test]
fn test_validation_rejects_empty_lists() {
    let err = Config::parse("[render]\nextensions = []\n").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"invalid value for 'extensions' in section '[render]': at least one template extension is required");

    let err = Config::parse("[render]\nencrypt_suffixes = [\"\"]\n").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"invalid value for 'encrypt_suffixes' in section '[render]': at least one non-empty suffix is required");

    assert!(Config::parse("[crypto]\nkey_env = \" \"\n").is_err());
}

#[test]
fn test_cli_overrides_win() {
    let config = ConfigLoader::new()
        .add_toml_str("[render]\nstrict = false\noutput = \"from-file\"\n")
        .set("render.strict", true)
        .unwrap()
        .set("render.output", "from-cli")
        .unwrap()
        .build()
        .unwrap();

    assert!(config.render.strict);
    assert_eq!(config.render.output, Path::new("from-cli"));
}

#[test]
fn test_set_all_applies_in_order() {
    let overrides: Vec<(&'static str, config::Value)> = vec![
        ("render.templates", "a".into()),
        ("render.templates", "b".into()),
        (
            "render.encrypt_suffixes",
            vec!["TOKEN".to_string()].into(),
        ),
    ];
    let config = ConfigLoader::new().set_all(overrides).unwrap().build().unwrap();
    assert_eq!(config.render.templates, Path::new("b"));
    assert_eq!(config.render.encrypt_suffixes, ["TOKEN"]);
}

#[test]
fn test_env_vars_layer_over_files() {
    let config = ConfigLoader::new()
        .add_toml_str("[render]\nstrict = false\n")
        .with_env_prefix(ENV_PREFIX)
        .with_env_vars([
            ("RENDER_CFG_RENDER__STRICT", "true"),
            ("RENDER_CFG_RENDER__ENV_FILES", ".env,.env.local"),
            ("RENDER_CFG_CRYPTO__KEY_ENV", "DEPLOY_KEY"),
            ("UNRELATED", "ignored"),
        ])
        .build()
        .unwrap();

    assert!(config.render.strict);
    assert_eq!(
        config.render.env_files,
        [PathBuf::from(".env"), PathBuf::from(".env.local")]
    );
    assert_eq!(config.crypto.key_env, "DEPLOY_KEY");
}

#[test]
fn test_walk_options_and_render_config() {
    let config = Config::parse(
        r#"
        [render]
        extensions = [".j2", "tmpl"]
        exclude = ["drafts/**"]
        include_hidden = false
        max_depth = 3
        "#,
    )
    .unwrap();

    let walk = config.walk_options();
    assert_eq!(walk.extensions(), ["j2", "tmpl"]);
    assert_eq!(walk.exclude(), ["drafts/**"]);
    assert!(!walk.include_hidden());
    assert_eq!(walk.max_depth(), Some(3));

    let render = config.to_render_config(true);
    assert!(render.dry_run());
    assert_eq!(render.template_dir(), Path::new("./templates"));
    assert_eq!(render.encrypt_suffixes(), ["PASSWORD", "SECRET", "KEY"]);
}

#[test]
fn test_key_sources() {
    let config = Config::parse("[crypto]\nkey_env = \"MY_KEY\"\n").unwrap();
    assert!(config.crypto.file_source().is_none());

    assert_eq!(
        config.crypto.env_source().describe(),
        "environment variable MY_KEY"
    );
}

#[test]
fn test_loaded_files_tracking() {
    let dir = tempfile::tempdir().unwrap();
    let present = dir.path().join("render-cfg.toml");
    std::fs::write(&present, "[render]\n").unwrap();

    let loader = ConfigLoader::new()
        .add_toml_file_optional(&present)
        .add_toml_file_optional(dir.path().join("absent.toml"))
        .add_toml_str("");

    let files = loader.loaded_files();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0], ("optional".to_string(), present));
    assert_eq!(loader.format_loaded_files()[1], "2. [string] <string>");
}

#[test]
fn test_missing_required_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::from_file(dir.path().join("nope.toml")).is_err());
}
