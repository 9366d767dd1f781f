//! bannerkit - build, preview and package multi-size banner ads.

#![allow(dead_code)]

mod actor;
mod archive;
mod build;
mod cli;
mod config;
mod core;
mod fingerprint;
mod logger;
mod reload;
mod upload;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{ProjectConfig, cfg, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = init_config(ProjectConfig::load(cli)?);

    match &cli.command {
        Commands::Build { .. } => build::full_build(&config),
        Commands::Serve { .. } => serve(&config),
        Commands::Zip { force } => cli::zip::run_zip(&config, *force),
        Commands::Package => cli::package::run_package(&config),
        Commands::Clean => cli::clean::run_clean(&config),
        Commands::Upload => upload::push_output(&config),
    }
}

// =============================================================================
// Serve Command
// =============================================================================

/// Bind first, build in the background, then enter the request loop.
///
/// The server answers with a loading page until the initial build
/// finishes. With `skip_initial` (the default) an existing output tree is
/// served as-is and only stale units are refreshed by the watcher.
fn serve(config: &ProjectConfig) -> Result<()> {
    let bound_server = cli::serve::bind_server()?;

    let config_arc = cfg();
    std::thread::spawn(move || {
        if initial_build(&config_arc) {
            core::set_serving();
        }
    });

    bound_server.run()
}

/// Run or skip the initial build. Returns false when shutdown was
/// requested mid-build.
fn initial_build(config: &ProjectConfig) -> bool {
    let has_output = config.output_root().is_dir()
        && build::list_output_units(config).is_ok_and(|units| !units.is_empty());

    if config.build.skip_initial && !config.build.clean && has_output {
        log!("serve"; "using existing build (skip_initial)");
        return !core::is_shutdown();
    }

    if let Err(e) = build::full_build(config) {
        log!("error"; "initial build failed: {:#}", e);
        // Serve whatever exists; the watcher retries on the next change
    }
    !core::is_shutdown()
}
