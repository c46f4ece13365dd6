// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for CLI parsing.
//!
//! Parses realistic command lines and feeds the overrides through the
//! config loader the way the binary does.

use clap::Parser;
use render_cfg::cli::{Cli, Command};
use render_cfg::config::{Config, ConfigLoader};
use std::path::Path;

fn config_for(args: &[&str], file: &str) -> Config {
    let cli = Cli::try_parse_from(args).unwrap();
    ConfigLoader::new()
        .add_toml_str(file)
        .set_all(cli.render.to_config_overrides())
        .unwrap()
        .build()
        .unwrap()
}

// =============================================================================
// Render (no subcommand)
// =============================================================================

#[test]
fn cli_defaults_leave_config_untouched() {
    let config = config_for(
        &["render-cfg"],
        "[render]\ntemplates = \"tpl\"\nstrict = true\n",
    );
    assert_eq!(config.render.templates, Path::new("tpl"));
    assert!(config.render.strict);
    assert_eq!(config.render.env_files, [Path::new(".env")]);
}

#[test]
fn cli_flags_override_config_file() {
    let config = config_for(
        &[
            "render-cfg",
            "--templates",
            "deploy",
            "--output",
            "/etc/app",
            "--env",
            ".env,.env.prod",
            "--encrypt",
            "PASSWORD",
            "--encrypt",
            "TOKEN",
        ],
        "[render]\ntemplates = \"tpl\"\noutput = \"out\"\nenv_files = [\"base.env\"]\n",
    );

    assert_eq!(config.render.templates, Path::new("deploy"));
    assert_eq!(config.render.output, Path::new("/etc/app"));
    assert_eq!(
        config.render.env_files,
        [Path::new(".env"), Path::new(".env.prod")]
    );
    assert_eq!(config.render.encrypt_suffixes, ["PASSWORD", "TOKEN"]);
}

#[test]
fn cli_no_strict_overrides_config_file() {
    let config = config_for(&["render-cfg", "--no-strict"], "[render]\nstrict = true\n");
    assert!(!config.render.strict);

    let config = config_for(&["render-cfg"], "[render]\nstrict = true\n");
    assert!(config.render.strict);
}

#[test]
fn cli_key_flags_reach_crypto_section() {
    let config = config_for(
        &["render-cfg", "--key-env", "APP_KEY", "--key-file", "k.b64"],
        "",
    );
    assert_eq!(config.crypto.key_env, "APP_KEY");
    assert_eq!(config.crypto.key_file.as_deref(), Some(Path::new("k.b64")));
}

#[test]
fn cli_dry_is_not_a_config_value() {
    let cli = Cli::try_parse_from(["render-cfg", "--dry"]).unwrap();
    assert!(cli.render.dry);
    assert!(cli.render.to_config_overrides().is_empty());
}

// =============================================================================
// Subcommands
// =============================================================================

#[test]
fn cli_list_json() {
    let cli = Cli::try_parse_from(["render-cfg", "-t", "tpl", "list", "--json"]).unwrap();
    assert!(matches!(cli.command, Some(Command::List(ref args)) if args.json));
    assert_eq!(cli.render.to_config_overrides().len(), 1);
}

#[test]
fn cli_decrypt_takes_values_in_order() {
    let cli = Cli::try_parse_from(["render-cfg", "decrypt", "b", "a", "--key-file", "k"]).unwrap();
    let Some(Command::Decrypt(args)) = cli.command else {
        panic!("expected decrypt");
    };
    assert_eq!(args.ciphertexts, ["b", "a"]);
    assert_eq!(cli.render.key_file.as_deref(), Some(Path::new("k")));
}

#[test]
fn cli_unknown_flag_rejected() {
    assert!(Cli::try_parse_from(["render-cfg", "--no-such-flag"]).is_err());
}

#[test]
fn cli_help_mentions_config_file() {
    let err = Cli::try_parse_from(["render-cfg", "--help"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    assert!(err.to_string().contains("render-cfg.toml"));
}
