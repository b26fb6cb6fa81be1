// contao-devtools/src/imageoptim/mod.rs
pub(crate) mod logic;

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::Context;
use tempfile::NamedTempFile;

use crate::config::{DeploymentManifest, ToolConfig};
use crate::errors::{AppError, Result};
use crate::runner::ShellRunner;
use crate::utils;
use crate::utils::console;

/// Node driver that compresses one directory of images; shipped inside the
/// binary and written to a temp file for the pipeline run.
const DRIVER_SCRIPT: &str = include_str!("../../resources/dev/app.js");

/// Public entry point for the image optimization process: downloads the
/// remote files directory, compresses every image folder locally through
/// imagemin, then backs up and replaces the remote files.
pub async fn run_image_optim_flow(project_dir: &Path, environment: &str) -> Result<ExitCode> {
    utils::require_executables(&["ssh", "scp", "node"])?;

    let tool_config = ToolConfig::load(project_dir)?;
    let manifest = DeploymentManifest::load(project_dir)?;
    let target = manifest.environment(environment)?.target()?;

    let confirmed = console::confirm(
        "Are you sure you want to optimize all JPEG & PNG images? This will replace the original images!\n\nThis command creates a backup in the remote's shared directory",
        true,
    )?;
    if !confirmed {
        eprintln!("❌ Abort command.");
        return Ok(ExitCode::from(1));
    }

    check_for_imagemin(project_dir)?;

    let start = Instant::now();
    let script = materialize_driver_script()?;
    let mut runner = ShellRunner::new(project_dir);
    let plan = logic::OptimPlan {
        target: &target,
        project_dir,
        script: script.path(),
        console: tool_config.console(&manifest),
        settings: &tool_config.imageoptim,
    };

    match logic::perform_optim_pipeline(&mut runner, &plan).await {
        Ok(()) => {
            console::report_success("Optimization", start.elapsed().as_secs_f64());
            Ok(ExitCode::SUCCESS)
        }
        Err(AppError::Command(failure)) => {
            console::report_failure("Optimization", start.elapsed().as_secs_f64(), &failure);
            Ok(ExitCode::from(2))
        }
        Err(other) => Err(other),
    }
}

/// The compressor plugins are plain node modules the project has to
/// install; without them every optimize step would fail.
fn check_for_imagemin(project_dir: &Path) -> Result<()> {
    if !project_dir.join("node_modules").join("imagemin").exists() {
        return Err(AppError::Config(
            "Imagemin node-modules not found. Please see readme.md for detailed information."
                .to_string(),
        ));
    }

    Ok(())
}

fn materialize_driver_script() -> Result<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("imageoptim_")
        .suffix(".js")
        .tempfile()
        .context("Failed to create temp file for the image driver script")?;
    file.write_all(DRIVER_SCRIPT.as_bytes())
        .context("Failed to write the image driver script")?;

    Ok(file)
}
