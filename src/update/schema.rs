// contao-devtools/src/update/schema.rs
use crate::errors::Result;

/// One executable statement of a schema diff, addressed by a stable id.
#[derive(Debug, Clone)]
pub struct SchemaCommand {
    pub id: String,
    pub sql: String,
}

/// Statements of one diff category (CREATE, ALTER_ADD, DROP, ...), in the
/// order the schema provider emitted them.
#[derive(Debug, Clone)]
pub struct SchemaCommandGroup {
    pub category: String,
    pub statements: Vec<SchemaCommand>,
}

/// Contract to the project's schema installer: `commands` returns the
/// currently pending diff grouped by category, `execute` runs a single
/// statement by id. The diff is expected to shrink as statements execute.
pub trait SchemaInstaller {
    fn commands(&mut self) -> Result<Vec<SchemaCommandGroup>>;
    fn execute(&mut self, id: &str) -> Result<()>;
}

/// Installer wired when the project provides no schema diff source; it
/// always reports an empty diff.
pub struct NoPendingSchema;

impl SchemaInstaller for NoPendingSchema {
    fn commands(&mut self) -> Result<Vec<SchemaCommandGroup>> {
        Ok(Vec::new())
    }

    fn execute(&mut self, _id: &str) -> Result<()> {
        Ok(())
    }
}

/// Default confirmation answer per category when forcing. Destructive
/// categories flip to yes only outside save mode. Unknown categories have
/// no default and fall back to no.
pub(crate) fn default_answer(category: &str, save_mode: bool) -> Option<bool> {
    match category {
        "CREATE" | "ALTER_TABLE" | "ALTER_CHANGE" | "ALTER_ADD" => Some(true),
        "DROP" | "ALTER_DROP" => Some(!save_mode),
        _ => None,
    }
}
