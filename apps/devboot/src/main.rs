//! devboot - Developer environment bootstrap
//!
//! CLI front end for the installation layer: it builds the managers from the
//! configuration and catalog, drives the requested operations and owns the
//! receiving end of the event channel (terminal output and channel logs).

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod setup;

use crate::cli::{Cli, Commands};
use crate::display::{CommandOutcome, OutputRenderer, PackageOutcome};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::setup::SystemSetup;
use clap::Parser;
use devboot_config::Config;
use devboot_events::{
    AppEvent, EventEmitter, EventReceiver, FailureContext, GeneralEvent, PackageOperation,
};
use devboot_packages::PackageManager;
use devboot_types::{ColorChoice, PackageInfo};
use futures::future::join_all;
use std::path::Path;
use std::process;
use tokio::select;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug, &Config::default().log_dir());

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Main application logic, `Ok(false)` when the command itself failed
async fn run(cli: Cli) -> Result<bool, CliError> {
    info!("Starting devboot v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global);

    let (event_sender, event_receiver) = devboot_events::channel();
    event_sender.emit(AppEvent::General(GeneralEvent::ConfigurationValidated {
        source: cli
            .global
            .config
            .as_ref()
            .map_or_else(|| "default".to_string(), |p| p.display().to_string()),
        warnings: Vec::new(),
    }));

    let setup = SystemSetup::initialize(config, &event_sender).await?;

    let color = setup.config().general.color;
    let renderer = OutputRenderer::new(cli.global.json, color);
    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler =
        EventHandler::new(setup.config().log_dir(), colors_enabled, cli.global.debug)
            .quiet(cli.global.json);

    let outcome =
        execute_command_with_events(cli.command, &setup, event_receiver, &mut event_handler)
            .await?;

    renderer.render_outcome(&outcome)?;

    info!(success = outcome.is_success(), "Command completed");
    Ok(outcome.is_success())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    setup: &SystemSetup,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandOutcome, CliError> {
    let mut command_future = Box::pin(execute_command(command, setup));

    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    setup: &SystemSetup,
) -> Result<CommandOutcome, CliError> {
    if let Commands::Which { command } = command {
        let path = match setup.platform().process().which(&command).await {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(command = %command, error = %e, "command lookup failed");
                None
            }
        };
        return Ok(CommandOutcome::Which { command, path });
    }

    let Some(request) = command.package_request() else {
        return Err(CliError::Setup("command takes no packages".to_string()));
    };
    let manager = setup.managers().get(request.family).ok_or_else(|| {
        CliError::Setup(format!("no manager registered for {}", request.family))
    })?;

    // Each package is independent: one failure never stops the others
    let outcomes = join_all(
        request
            .packages
            .iter()
            .map(|package| run_package(manager.as_ref(), request.operation, package)),
    )
    .await;

    Ok(CommandOutcome::Packages {
        family: request.family,
        operation: request.operation,
        outcomes,
    })
}

async fn run_package(
    manager: &dyn PackageManager,
    operation: PackageOperation,
    package: &PackageInfo,
) -> PackageOutcome {
    let result = match operation {
        PackageOperation::Install => manager.install(package).await.map(|r| r.exit_code),
        PackageOperation::Uninstall => manager.uninstall(package).await.map(|()| None),
    };
    match result {
        Ok(exit_code) => PackageOutcome {
            name: package.name.clone(),
            exit_code,
            failure: None,
        },
        Err(e) => PackageOutcome {
            name: package.name.clone(),
            exit_code: None,
            failure: Some(FailureContext::from_error(&e)),
        },
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool, log_dir: &Path) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled {
        // Debug mode: structured JSON logs to file
        let opened = std::fs::create_dir_all(log_dir).and_then(|()| {
            let log_file = log_dir.join(format!(
                "devboot-{}.log",
                chrono::Utc::now().format("%Y%m%d-%H%M%S")
            ));
            std::fs::File::create(&log_file).map(|file| (file, log_file))
        });

        match opened {
            Ok((file, log_file)) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| {
                                tracing_subscriber::EnvFilter::new(
                                    "info,devboot=debug,devboot_packages=debug",
                                )
                            },
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) if !json_mode => eprintln!("Warning: Failed to create log file: {e}"),
            Err(_) => {}
        }
    }

    if json_mode {
        // JSON mode: keep stderr free of log lines
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        // Normal mode: minimal logging to stderr
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new("warn,devboot=warn,devboot_packages=warn")
                }),
            )
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Some(catalog) = &global.catalog {
        config.paths.catalog = Some(catalog.clone());
    }
}
