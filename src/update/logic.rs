// contao-devtools/src/update/logic.rs
use crate::errors::Result;
use crate::update::UpdateOptions;
use crate::update::manager::UpdateManager;
use crate::update::schema::{SchemaInstaller, default_answer};
use crate::utils::console;

/// Runs the registered update units, then walks the pending schema diff
/// category by category. Forced runs re-fetch the diff afterwards and start
/// over while categories with a default-yes answer remain pending, since
/// executed statements can surface new diff entries.
///
/// Returns the process exit status: 0 when done, 1 when invoked without
/// flags (report-only mode).
pub(crate) fn perform_update_flow<I, C>(
    manager: &mut UpdateManager,
    installer: &mut I,
    options: &UpdateOptions,
    confirm: &mut C,
) -> Result<u8>
where
    I: SchemaInstaller,
    C: FnMut(&str, bool) -> anyhow::Result<bool>,
{
    let save_mode = !options.complete;

    loop {
        console::title("Running Contao database updates");

        let messages = manager.run_updates()?;
        if !messages.is_empty() {
            for message in &messages {
                println!("{message}");
            }
            println!();
        }

        let groups = installer.commands()?;

        if groups.is_empty() {
            println!(
                "✅ Nothing to update - your database is already in sync with the current entity metadata."
            );
            return Ok(0);
        }

        let mut statement_count = 0;

        for group in &groups {
            statement_count += group.statements.len();

            if options.dump_sql {
                println!(
                    "The following SQL \"{}\" statements will be executed:",
                    group.category
                );
                println!();
                for statement in &group.statements {
                    println!("    {};", statement.sql);
                }
                println!();
            }

            if options.force {
                let default = default_answer(&group.category, save_mode).unwrap_or(false);
                let question = format!("Do you wanna run the \"{}\" statements?", group.category);

                if !confirm(&question, default)? {
                    println!("Skipping these statements...");
                    println!();
                    continue;
                }

                println!("Updating database schema...");
                for statement in &group.statements {
                    installer.execute(&statement.id)?;
                }

                let pluralization = if group.statements.len() == 1 {
                    "query was"
                } else {
                    "queries were"
                };
                println!("    {} {} executed", group.statements.len(), pluralization);
                println!("✅ Database schema updated successfully!");
            }
        }

        if options.force {
            println!("✅ Contao database updates successfully executed.");

            let fresh = installer.commands()?;
            let start_over = fresh
                .iter()
                .any(|group| default_answer(&group.category, save_mode) == Some(true));

            if start_over && !fresh.is_empty() {
                continue;
            }
        }

        if options.dump_sql || options.force {
            return Ok(0);
        }

        println!("\n⚠️ This operation should not be executed in a production environment!");
        println!();
        println!("Use the incremental update to detect changes during development and use");
        println!("the SQL DDL provided to manually update your database in production.");
        println!();
        println!(
            "The Contao Updater would execute \"{statement_count}\" queries to update the database."
        );
        println!();
        println!("Please run the operation by passing one - or both - of the following options:");
        println!();
        println!("    contao-devtools db-update --force to execute the command");
        println!("    contao-devtools db-update --dump-sql to dump the SQL statements to the screen");
        println!();

        return Ok(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::manager::UpdateUnit;
    use crate::update::schema::{SchemaCommand, SchemaCommandGroup};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    struct ScriptedInstaller {
        rounds: VecDeque<Vec<SchemaCommandGroup>>,
        executed: Vec<String>,
        fail_on: Option<&'static str>,
    }

    impl ScriptedInstaller {
        fn new(rounds: Vec<Vec<SchemaCommandGroup>>) -> Self {
            ScriptedInstaller {
                rounds: rounds.into(),
                executed: Vec::new(),
                fail_on: None,
            }
        }
    }

    impl SchemaInstaller for ScriptedInstaller {
        fn commands(&mut self) -> Result<Vec<SchemaCommandGroup>> {
            Ok(self.rounds.pop_front().unwrap_or_default())
        }

        fn execute(&mut self, id: &str) -> Result<()> {
            if self.fail_on == Some(id) {
                return Err(anyhow::anyhow!("statement {id} failed").into());
            }
            self.executed.push(id.to_string());
            Ok(())
        }
    }

    fn group(category: &str, ids: &[&str]) -> SchemaCommandGroup {
        SchemaCommandGroup {
            category: category.to_string(),
            statements: ids
                .iter()
                .map(|id| SchemaCommand {
                    id: id.to_string(),
                    sql: format!("-- {id}"),
                })
                .collect(),
        }
    }

    /// Answers every confirmation with its default, like an operator
    /// hammering the enter key, and records what was asked.
    fn default_confirmer(
        asked: &Rc<RefCell<Vec<(String, bool)>>>,
    ) -> impl FnMut(&str, bool) -> anyhow::Result<bool> + use<> {
        let asked = Rc::clone(asked);
        move |question: &str, default: bool| {
            asked.borrow_mut().push((question.to_string(), default));
            Ok(default)
        }
    }

    struct OneShotUnit {
        pending: bool,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl UpdateUnit for OneShotUnit {
        fn should_run(&self) -> bool {
            self.pending
        }

        fn run(&mut self) -> anyhow::Result<String> {
            self.pending = false;
            self.log.borrow_mut().push("unit");
            Ok("Ran the one-shot update.".to_string())
        }
    }

    #[test]
    fn test_empty_diff_reports_nothing_to_update() -> anyhow::Result<()> {
        let mut manager = UpdateManager::new();
        let mut installer = ScriptedInstaller::new(vec![vec![]]);
        let asked = Rc::new(RefCell::new(Vec::new()));

        let code = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions::default(),
            &mut default_confirmer(&asked),
        )?;

        assert_eq!(code, 0);
        assert!(installer.executed.is_empty());
        assert!(asked.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn test_without_flags_reports_and_exits_with_one() -> anyhow::Result<()> {
        let mut manager = UpdateManager::new();
        let mut installer =
            ScriptedInstaller::new(vec![vec![group("CREATE", &["a"]), group("DROP", &["b"])]]);
        let asked = Rc::new(RefCell::new(Vec::new()));

        let code = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions::default(),
            &mut default_confirmer(&asked),
        )?;

        assert_eq!(code, 1);
        assert!(installer.executed.is_empty());
        assert!(asked.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn test_dump_sql_never_executes_statements() -> anyhow::Result<()> {
        let mut manager = UpdateManager::new();
        let mut installer = ScriptedInstaller::new(vec![vec![group("CREATE", &["a", "b"])]]);
        let asked = Rc::new(RefCell::new(Vec::new()));

        let code = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions {
                dump_sql: true,
                ..UpdateOptions::default()
            },
            &mut default_confirmer(&asked),
        )?;

        assert_eq!(code, 0);
        assert!(installer.executed.is_empty());
        assert!(asked.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn test_force_executes_default_yes_categories_and_keeps_drops_pending() -> anyhow::Result<()> {
        let mut manager = UpdateManager::new();
        // DROP stays pending after the run; in save mode its default answer
        // is no, so the flow must not start over for it.
        let mut installer = ScriptedInstaller::new(vec![
            vec![group("CREATE", &["a", "b"]), group("DROP", &["c"])],
            vec![group("DROP", &["c"])],
        ]);
        let asked = Rc::new(RefCell::new(Vec::new()));

        let code = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions {
                force: true,
                ..UpdateOptions::default()
            },
            &mut default_confirmer(&asked),
        )?;

        assert_eq!(code, 0);
        assert_eq!(installer.executed, vec!["a", "b"]);
        assert_eq!(
            *asked.borrow(),
            vec![
                ("Do you wanna run the \"CREATE\" statements?".to_string(), true),
                ("Do you wanna run the \"DROP\" statements?".to_string(), false),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_force_complete_also_executes_destructive_categories() -> anyhow::Result<()> {
        let mut manager = UpdateManager::new();
        let mut installer = ScriptedInstaller::new(vec![
            vec![group("CREATE", &["a"]), group("ALTER_DROP", &["b"])],
            vec![],
        ]);
        let asked = Rc::new(RefCell::new(Vec::new()));

        let code = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions {
                complete: true,
                force: true,
                ..UpdateOptions::default()
            },
            &mut default_confirmer(&asked),
        )?;

        assert_eq!(code, 0);
        assert_eq!(installer.executed, vec!["a", "b"]);
        assert_eq!(
            *asked.borrow(),
            vec![
                ("Do you wanna run the \"CREATE\" statements?".to_string(), true),
                ("Do you wanna run the \"ALTER_DROP\" statements?".to_string(), true),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_force_starts_over_while_default_yes_diff_remains() -> anyhow::Result<()> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut manager = UpdateManager::new();
        manager.register(Box::new(OneShotUnit {
            pending: true,
            log: Rc::clone(&log),
        }));

        // Executing "a" surfaces a new pending CREATE statement "b"; the
        // second round executes it and settles the diff.
        let mut installer = ScriptedInstaller::new(vec![
            vec![group("CREATE", &["a"])],
            vec![group("CREATE", &["b"])],
            vec![group("CREATE", &["b"])],
            vec![],
        ]);
        let asked = Rc::new(RefCell::new(Vec::new()));

        let code = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions {
                force: true,
                ..UpdateOptions::default()
            },
            &mut default_confirmer(&asked),
        )?;

        assert_eq!(code, 0);
        assert_eq!(installer.executed, vec!["a", "b"]);
        // The one-shot unit ran in the first round only.
        assert_eq!(*log.borrow(), vec!["unit"]);
        Ok(())
    }

    #[test]
    fn test_declined_category_is_skipped() -> anyhow::Result<()> {
        let mut manager = UpdateManager::new();
        let mut installer = ScriptedInstaller::new(vec![
            vec![group("DROP", &["a"])],
            vec![group("DROP", &["a"])],
        ]);

        let code = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions {
                force: true,
                ..UpdateOptions::default()
            },
            &mut |_question: &str, _default: bool| Ok(false),
        )?;

        assert_eq!(code, 0);
        assert!(installer.executed.is_empty());
        Ok(())
    }

    #[test]
    fn test_failing_statement_aborts_the_flow() {
        let mut manager = UpdateManager::new();
        let mut installer = ScriptedInstaller::new(vec![vec![group("CREATE", &["a", "b"])]]);
        installer.fail_on = Some("b");
        let asked = Rc::new(RefCell::new(Vec::new()));

        let result = perform_update_flow(
            &mut manager,
            &mut installer,
            &UpdateOptions {
                force: true,
                ..UpdateOptions::default()
            },
            &mut default_confirmer(&asked),
        );

        assert!(result.is_err());
        assert_eq!(installer.executed, vec!["a"]);
    }
}
