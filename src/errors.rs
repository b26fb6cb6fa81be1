// contao-devtools/src/errors.rs
use thiserror::Error;

/// Captured diagnostics of a failed subtask: the literal command line and
/// whatever the process wrote to stderr before it exited or was killed.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    pub label: String,
    pub command_line: String,
    pub stderr: String,
    pub timed_out: bool,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Command failed: {}", .0.command_line)]
    Command(CommandFailure),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Env file error: {0}")]
    EnvFile(#[from] dotenv::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
