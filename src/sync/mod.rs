// contao-devtools/src/sync/mod.rs
pub(crate) mod logic;

use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use crate::config::{DeploymentManifest, ToolConfig, resolve_environment};
use crate::errors::{AppError, Result};
use crate::runner::ShellRunner;
use crate::utils;
use crate::utils::console;

#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    pub timeout_secs: u64,
    pub database_only: bool,
}

/// Public entry point for the sync process: resolves the environment, asks
/// for confirmation and runs the pipeline against the local shell.
pub async fn run_sync_flow(
    project_dir: &Path,
    environment: &str,
    options: SyncOptions,
) -> Result<ExitCode> {
    utils::require_executables(&["ssh", "scp", "mysql"])?;

    let tool_config = ToolConfig::load(project_dir)?;
    let manifest = DeploymentManifest::load(project_dir)?;
    let descriptor = resolve_environment(project_dir, &manifest, environment)?;

    let confirmed = console::confirm(
        "Are you sure to synchronise from a remote installation? This will overwrite your local data!",
        true,
    )?;
    if !confirmed {
        eprintln!("❌ Abort synchronisation.");
        return Ok(ExitCode::from(1));
    }

    let start = Instant::now();
    let mut runner = ShellRunner::new(project_dir);
    let plan = logic::SyncPlan {
        descriptor: &descriptor,
        console: tool_config.console(&manifest),
        web_dir: &tool_config.web_dir,
        options,
    };

    match logic::perform_sync_pipeline(&mut runner, &plan).await {
        Ok(()) => {
            console::report_success("Synchronisation", start.elapsed().as_secs_f64());
            Ok(ExitCode::SUCCESS)
        }
        Err(AppError::Command(failure)) => {
            console::report_failure("Synchronisation", start.elapsed().as_secs_f64(), &failure);
            Ok(ExitCode::from(2))
        }
        Err(other) => Err(other),
    }
}
