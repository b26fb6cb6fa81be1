// contao-devtools/src/utils/console.rs
use anyhow::{Context, Result};

use crate::errors::CommandFailure;

/// Asks a yes/no question on stdout and reads the answer from stdin.
/// An empty answer takes the default.
pub fn confirm(question: &str, default_yes: bool) -> Result<bool> {
    use std::io::{Write, stdin, stdout};

    let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    print!("{question} {hint} ");
    stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    stdin()
        .read_line(&mut input)
        .context("Failed to read user input")?;

    Ok(parse_confirmation(&input, default_yes))
}

/// Answers are matched on their first letter, like the usual shell prompts:
/// anything starting with y/Y is a yes, everything else a no.
fn parse_confirmation(input: &str, default_yes: bool) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return default_yes;
    }
    trimmed.to_lowercase().starts_with('y')
}

/// Prints an underlined section title for the following pipeline steps.
pub fn title(text: &str) {
    println!("\n{text}");
    println!("{}", "=".repeat(text.chars().count()));
}

pub fn note(text: &str) {
    println!("! {text}");
}

/// Final report of a pipeline that completed all steps.
pub fn report_success(operation: &str, elapsed_secs: f64) {
    println!("\n✅ {operation} completed in {elapsed_secs:.2} seconds.");
}

/// Final report of a pipeline that aborted on a failed step: elapsed time,
/// the failed step, captured stderr and the exact command line, for
/// operator diagnosis. The step status lines go to stdout, so the report
/// repeats the step name to stay readable on a redirected stderr.
pub fn report_failure(operation: &str, elapsed_secs: f64, failure: &CommandFailure) {
    eprintln!("{}", failure_report(operation, elapsed_secs, failure));
}

fn failure_report(operation: &str, elapsed_secs: f64, failure: &CommandFailure) -> String {
    format!(
        "\n❌ {} failed after {:.2} seconds.\n\nStep:\n{}\n\nMessage:\n{}\n\nCommand:\n{}",
        operation,
        elapsed_secs,
        failure.label,
        failure.stderr.trim(),
        failure.command_line.trim()
    )
}
