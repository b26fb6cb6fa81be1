// contao-devtools/src/update/manager.rs
use crate::errors::Result;

/// One registered update step. Units are opaque to the manager: they decide
/// themselves whether they still need to run, and running them upgrades
/// persistent state exactly once.
pub trait UpdateUnit {
    fn should_run(&self) -> bool;
    fn run(&mut self) -> anyhow::Result<String>;
}

/// Ordered registry of update units. Registration order is execution order;
/// later units may assume earlier ones completed.
#[derive(Default)]
pub struct UpdateManager {
    units: Vec<Box<dyn UpdateUnit>>,
}

impl UpdateManager {
    pub fn new() -> Self {
        UpdateManager { units: Vec::new() }
    }

    pub fn register(&mut self, unit: Box<dyn UpdateUnit>) {
        self.units.push(unit);
    }

    /// Runs every pending unit in registration order and collects the
    /// non-empty result messages. A unit that fails aborts the remaining
    /// sequence.
    pub fn run_updates(&mut self) -> Result<Vec<String>> {
        let mut messages = Vec::new();

        for unit in &mut self.units {
            if !unit.should_run() {
                continue;
            }

            let message = unit.run()?;
            if !message.is_empty() {
                messages.push(message);
            }
        }

        Ok(messages)
    }
}
