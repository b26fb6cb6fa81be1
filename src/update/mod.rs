// contao-devtools/src/update/mod.rs
pub(crate) mod logic;
pub mod manager;
pub mod schema;

use std::process::ExitCode;

use crate::errors::Result;
use crate::utils::console;

pub use manager::{UpdateManager, UpdateUnit};
pub use schema::{NoPendingSchema, SchemaCommand, SchemaCommandGroup, SchemaInstaller};

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    pub complete: bool,
    pub dump_sql: bool,
    pub force: bool,
}

/// Public entry point for the db-update process. The manager carries the
/// update units registered at startup; the schema diff comes from the
/// project's installer.
pub fn run_db_update_flow<I: SchemaInstaller>(
    manager: &mut UpdateManager,
    installer: &mut I,
    options: &UpdateOptions,
) -> Result<ExitCode> {
    let code = logic::perform_update_flow(
        manager,
        installer,
        options,
        &mut |question: &str, default: bool| console::confirm(question, default),
    )?;

    Ok(ExitCode::from(code))
}
