// contao-devtools/src/utils/mod.rs
pub mod console;

use anyhow::{Context, Result};
use std::path::PathBuf;
use which::which;

/// Finds an executable in the system PATH.
pub fn find_executable(name: &str) -> Result<PathBuf> {
    which(name).with_context(|| {
        format!("{name} executable not found in PATH. Please ensure it is installed and in your PATH.")
    })
}

/// Checks every executable a pipeline needs before the first step runs, so
/// a missing tool surfaces up front instead of halfway through.
pub fn require_executables(names: &[&str]) -> Result<()> {
    for name in names {
        find_executable(name)?;
    }
    Ok(())
}
