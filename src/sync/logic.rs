// contao-devtools/src/sync/logic.rs
use crate::config::EnvironmentDescriptor;
use crate::errors::Result;
use crate::runner::{SubTask, TaskRunner};
use crate::sync::SyncOptions;
use crate::utils::console;

/// Everything the pipeline needs, resolved up front so no step touches
/// configuration again.
pub(crate) struct SyncPlan<'a> {
    pub descriptor: &'a EnvironmentDescriptor,
    pub console: &'a str,
    pub web_dir: &'a str,
    pub options: SyncOptions,
}

/// Runs the fixed sync sequence: prepare, filesystem sync (unless
/// database-only), database sync, symlink recreation. The first failed
/// sub-task aborts everything after it.
pub(crate) async fn perform_sync_pipeline<R: TaskRunner>(
    runner: &mut R,
    plan: &SyncPlan<'_>,
) -> Result<()> {
    prepare_sync(runner, plan).await?;

    if !plan.options.database_only {
        sync_filesystem(runner, plan).await?;
    }

    sync_database(runner, plan).await?;
    create_symlinks(runner, plan).await?;

    Ok(())
}

async fn prepare_sync<R: TaskRunner>(runner: &mut R, plan: &SyncPlan<'_>) -> Result<()> {
    let tmp = plan.descriptor.temp_directory.display();

    runner
        .run_task(&SubTask::new(
            "Created temporary sync directory.",
            format!("mkdir -p {tmp}"),
        ))
        .await
}

/// Lands the remote shared-files directory in the staging folder first, so
/// the live `files` directory is only removed once the copy has fully
/// arrived.
async fn sync_filesystem<R: TaskRunner>(runner: &mut R, plan: &SyncPlan<'_>) -> Result<()> {
    console::title("Synchronising remote filesystem");

    let d = plan.descriptor;
    let tmp = d.temp_directory.display();
    let timeout = plan.options.timeout_secs;

    runner
        .run_task(
            &SubTask::new(
                "Removed existing synced-files folder.",
                format!("rm -rf {tmp}/files"),
            )
            .timeout_secs(timeout),
        )
        .await?;

    runner
        .run_task(
            &SubTask::new(
                "Synchronised files to a new synced-files folder.",
                format!(
                    "scp -r {}@{}:{}/shared/files {}/files",
                    d.user, d.host, d.remote_directory, tmp
                ),
            )
            .timeout_secs(timeout),
        )
        .await?;

    runner
        .run_task(&SubTask::new("Removed existing files folder.", "rm -rf files").timeout_secs(timeout))
        .await?;

    runner
        .run_task(
            &SubTask::new(
                "Renamed synced-files folder to files.",
                format!("mv {tmp}/files files"),
            )
            .timeout_secs(timeout),
        )
        .await?;

    Ok(())
}

/// Dumps the remote database over SSH into the temp directory, imports the
/// dump locally and removes it. Passwords never appear in a command line:
/// the remote one is piped through the SSH channel and exported before
/// mysqldump starts, the local one rides in the child environment.
async fn sync_database<R: TaskRunner>(runner: &mut R, plan: &SyncPlan<'_>) -> Result<()> {
    console::title("Synchronising remote database");

    let d = plan.descriptor;
    let tmp = d.temp_directory.display();
    let timeout = plan.options.timeout_secs;
    let remote = &d.database_remote;
    let local = &d.database_local;

    let mut fetch = SubTask::new(
        "Fetch a MySQL dump from the remote server.",
        match &remote.pass {
            Some(_) => format!(
                "ssh {}@{} 'IFS= read -r MYSQL_PWD && export MYSQL_PWD && exec mysqldump -h{} --port={} -u{} {}' > {}/dump.sql",
                d.user, d.host, remote.host, remote.port, remote.user, remote.name, tmp
            ),
            None => format!(
                "ssh {}@{} \"mysqldump -h{} --port={} -u{} {}\" > {}/dump.sql",
                d.user, d.host, remote.host, remote.port, remote.user, remote.name, tmp
            ),
        },
    )
    .timeout_secs(timeout);
    if let Some(pass) = &remote.pass {
        fetch = fetch.stdin(format!("{pass}\n"));
    }
    runner.run_task(&fetch).await?;

    let mut import = SubTask::new(
        "Import dump from temporary file.",
        format!(
            "mysql -h{} --port={} -u{} {} < {}/dump.sql",
            local.host, local.port, local.user, local.name, tmp
        ),
    )
    .timeout_secs(timeout);
    if let Some(pass) = &local.pass {
        import = import.env("MYSQL_PWD", pass);
    }
    runner.run_task(&import).await?;

    runner
        .run_task(
            &SubTask::new("Clean up temporary files.", format!("rm {tmp}/dump.sql"))
                .timeout_secs(timeout),
        )
        .await?;

    Ok(())
}

async fn create_symlinks<R: TaskRunner>(runner: &mut R, plan: &SyncPlan<'_>) -> Result<()> {
    runner
        .run_task(
            &SubTask::new(
                "Recreated symlinks for the web directory.",
                format!("{} contao:symlinks {}", plan.console, plan.web_dir),
            )
            .timeout_secs(plan.options.timeout_secs),
        )
        .await
}
