// contao-devtools/src/runner/mod.rs
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::errors::{AppError, CommandFailure, Result};

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// One shell command of a pipeline, with its operator-facing label.
#[derive(Debug, Clone)]
pub struct SubTask {
    pub label: String,
    pub command: String,
    pub timeout_secs: u64,
    pub envs: Vec<(String, String)>,
    pub stdin: Option<String>,
}

impl SubTask {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        SubTask {
            label: label.into(),
            command: command.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            envs: Vec::new(),
            stdin: None,
        }
    }

    pub fn timeout_secs(mut self, seconds: u64) -> Self {
        self.timeout_secs = seconds;
        self
    }

    /// Injects a variable into the child environment only, keeping it out
    /// of the command line.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Feeds the given text to the child's stdin, then closes the pipe.
    pub fn stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

/// Executes pipeline sub-tasks. Implemented by [`ShellRunner`] in
/// production and by recording stubs in tests.
pub trait TaskRunner {
    async fn run_task(&mut self, task: &SubTask) -> Result<()>;
}

/// Runs each sub-task through `sh -c` in the project directory. Output is
/// captured, not streamed; a task that overruns its timeout is killed and
/// reported as failed.
pub struct ShellRunner {
    project_dir: PathBuf,
}

impl ShellRunner {
    pub fn new(project_dir: &Path) -> Self {
        ShellRunner {
            project_dir: project_dir.to_path_buf(),
        }
    }
}

impl TaskRunner for ShellRunner {
    async fn run_task(&mut self, task: &SubTask) -> Result<()> {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(&task.command)
            .current_dir(&self.project_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        command.stdin(if task.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

        for (key, value) in &task.envs {
            command.env(key, value);
        }

        let mut child = command
            .spawn()
            .with_context(|| format!("Failed to spawn shell for task: {}", task.label))?;

        if let Some(input) = &task.stdin {
            let mut stdin = child
                .stdin
                .take()
                .context("Child process stdin was not captured")?;
            stdin
                .write_all(input.as_bytes())
                .await
                .context("Failed to write to child process stdin")?;
        }

        let waited = timeout(
            Duration::from_secs(task.timeout_secs),
            child.wait_with_output(),
        )
        .await;

        let output = match waited {
            Ok(result) => result
                .with_context(|| format!("Failed to collect output of task: {}", task.label))?,
            Err(_) => {
                println!("✗ {}", task.label);
                return Err(AppError::Command(CommandFailure {
                    label: task.label.clone(),
                    command_line: task.command.clone(),
                    stderr: format!(
                        "Process exceeded the timeout of {} seconds and was killed.",
                        task.timeout_secs
                    ),
                    timed_out: true,
                }));
            }
        };

        if !output.status.success() {
            println!("✗ {}", task.label);
            return Err(AppError::Command(CommandFailure {
                label: task.label.clone(),
                command_line: task.command.clone(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                timed_out: false,
            }));
        }

        println!("✓ {}", task.label);
        Ok(())
    }
}
