// contao-devtools/src/imageoptim/logic.rs
use std::path::{Path, PathBuf};

use chrono::Utc;
use walkdir::WalkDir;

use crate::config::{ImageOptimSettings, SyncTarget};
use crate::errors::Result;
use crate::runner::{SubTask, TaskRunner};
use crate::utils::console;

pub(crate) struct OptimPlan<'a> {
    pub target: &'a SyncTarget,
    pub project_dir: &'a Path,
    pub script: &'a Path,
    pub console: &'a str,
    pub settings: &'a ImageOptimSettings,
}

impl OptimPlan<'_> {
    fn temp_root(&self) -> PathBuf {
        self.project_dir.join("var").join("imgOpt")
    }

    fn staging(&self) -> PathBuf {
        self.temp_root().join("files")
    }
}

/// Runs the fixed optimization sequence: download the remote files into the
/// staging folder, compress every directory in place, back up the remote
/// files, upload the compressed tree, resync the remote file registry and
/// drop the staging folder. The first failed sub-task aborts everything
/// after it.
pub(crate) async fn perform_optim_pipeline<R: TaskRunner>(
    runner: &mut R,
    plan: &OptimPlan<'_>,
) -> Result<()> {
    fetch_remote_files(runner, plan).await?;
    optimize_images(runner, plan).await?;
    backup_remote_files(runner, plan).await?;
    upload_optimized_files(runner, plan).await?;
    resync_remote_files(runner, plan).await?;
    remove_temp_folder(runner, plan).await?;

    Ok(())
}

async fn fetch_remote_files<R: TaskRunner>(runner: &mut R, plan: &OptimPlan<'_>) -> Result<()> {
    let staging = plan.staging();
    let temp_root = plan.temp_root();
    let t = plan.target;

    // A leftover staging folder means the previous run did not finish.
    if staging.exists() {
        runner
            .run_task(&SubTask::new(
                "Removed previous folder.",
                format!("rm -rf {}", staging.display()),
            ))
            .await?;
    }

    if !temp_root.exists() {
        runner
            .run_task(&SubTask::new(
                "Created temporary folder.",
                format!("mkdir {}", temp_root.display()),
            ))
            .await?;
    }

    runner
        .run_task(&SubTask::new(
            "Remote files have been downloaded and are ready to be optimized!",
            format!(
                "scp -r {}@{}:{}/shared/files {}",
                t.user,
                t.host,
                t.remote_directory,
                staging.display()
            ),
        ))
        .await
}

/// The compressor script works on one directory at a time and does not
/// recurse, so every subdirectory of the staging tree gets its own
/// invocation, parents before children.
async fn optimize_images<R: TaskRunner>(runner: &mut R, plan: &OptimPlan<'_>) -> Result<()> {
    let staging = plan.staging();

    let mut directories = vec![staging.clone()];
    if staging.is_dir() {
        for entry in WalkDir::new(&staging).min_depth(1).sort_by_file_name() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                directories.push(entry.into_path());
            }
        }
    }

    for directory in &directories {
        console::note(&directory.display().to_string());
    }

    let jpeg = &plan.settings.jpeg;
    let png = &plan.settings.png;

    for directory in &directories {
        runner
            .run_task(&SubTask::new(
                format!(
                    "Optimize JPEG & PNG images in directory \"{}\"",
                    directory.display()
                ),
                format!(
                    "node {} \"{}\" {} {} {}",
                    plan.script.display(),
                    directory.display(),
                    jpeg.quality,
                    png.quality,
                    png.speed
                ),
            ))
            .await?;
    }

    Ok(())
}

async fn backup_remote_files<R: TaskRunner>(runner: &mut R, plan: &OptimPlan<'_>) -> Result<()> {
    let t = plan.target;
    let timestamp = Utc::now().timestamp();

    runner
        .run_task(&SubTask::new(
            "Remote backup has been created.",
            format!(
                "ssh {}@{} 'cp -r {}/shared/files {}/shared/backup_{}'",
                t.user, t.host, t.remote_directory, t.remote_directory, timestamp
            ),
        ))
        .await
}

async fn upload_optimized_files<R: TaskRunner>(runner: &mut R, plan: &OptimPlan<'_>) -> Result<()> {
    let t = plan.target;

    runner
        .run_task(&SubTask::new(
            "Files have been uploaded.",
            format!(
                "scp -r {} {}@{}:{}/shared",
                plan.staging().display(),
                t.user,
                t.host,
                t.remote_directory
            ),
        ))
        .await
}

async fn resync_remote_files<R: TaskRunner>(runner: &mut R, plan: &OptimPlan<'_>) -> Result<()> {
    let t = plan.target;

    runner
        .run_task(&SubTask::new(
            "Remote filesync invoked.",
            format!(
                "ssh {}@{} 'cd {}/current/; {} contao:filesync'",
                t.user, t.host, t.remote_directory, plan.console
            ),
        ))
        .await
}

async fn remove_temp_folder<R: TaskRunner>(runner: &mut R, plan: &OptimPlan<'_>) -> Result<()> {
    let temp_root = plan.temp_root();

    if temp_root.exists() {
        runner
            .run_task(&SubTask::new(
                "Removed temporary folder.",
                format!("rm -rf {}", temp_root.display()),
            ))
            .await?;
    }

    Ok(())
}
