// render-cfg: Configuration Template Renderer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Config --> Command Dispatch
//!   (render) | List | Decrypt | Keygen | Options | ConfigFiles | Version
//! ```

use std::process::ExitCode;

use render_cfg::cli::global::GlobalOptions;
use render_cfg::cli::{self, Cli, Command};
use render_cfg::cmd::config::{run_config_files_command, run_options_command};
use render_cfg::cmd::crypto::{run_decrypt_command, run_keygen_command};
use render_cfg::cmd::list::run_list_command;
use render_cfg::cmd::render::run_render_command;
use render_cfg::config::loader::ConfigLoader;
use render_cfg::config::{Config, DEFAULT_CONFIG_FILE, ENV_PREFIX};
use render_cfg::logging::init_logging;
use render_cfg::logging::{LogConfig, LogLevel};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli)
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    let console_level = global
        .log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(LogLevel::INFO);

    let file_level = global
        .file_log_level
        .and_then(LogLevel::from_u8)
        .unwrap_or(console_level);

    LogConfig::builder()
        .with_console_level(console_level)
        .with_file_level(file_level)
        .maybe_with_log_file(global.log_file.as_ref().map(|p| p.display().to_string()))
        .build()
}

fn dispatch_command(cli: &Cli) -> ExitCode {
    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Keygen) => {
            run_keygen_command();
            Ok(())
        }
        Some(Command::Options) => load_config(cli).map(|config| run_options_command(&config)),
        Some(Command::ConfigFiles) => {
            let loader = build_config_loader(&cli.global);
            run_config_files_command(&loader.format_loaded_files());
            Ok(())
        }
        Some(Command::List(args)) => {
            load_config(cli).and_then(|config| run_list_command(args, &config))
        }
        Some(Command::Decrypt(args)) => {
            load_config(cli).and_then(|config| run_decrypt_command(args, &config))
        }
        None => load_config(cli).and_then(|config| run_render_command(&config, cli.render.dry)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn build_config_loader(global: &GlobalOptions) -> ConfigLoader {
    let mut loader = ConfigLoader::new();
    if !global.no_default_config {
        loader = loader.add_toml_file_optional(DEFAULT_CONFIG_FILE);
    }
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader.with_env_prefix(ENV_PREFIX)
}

fn load_config(cli: &Cli) -> render_cfg::error::Result<Config> {
    build_config_loader(&cli.global)
        .set_all(cli.render.to_config_overrides())?
        .build()
        .map_err(|e| e.context("failed to load configuration"))
}
