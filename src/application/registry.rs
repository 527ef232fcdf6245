//! # Command Registry
//!
//! Maps trigger keywords and ids to commands. Built once per handler instantiation and
//! read-only afterwards. Registration order is kept for listings.

use crate::domain::traits::Command;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Arc<dyn Command>>,
    by_trigger: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a command, replacing any earlier command with the same id in place
    /// (last registration wins, listing position is kept).
    pub fn register<C: Command + 'static>(&mut self, command: C) {
        self.register_arc(Arc::new(command));
    }

    pub fn register_arc(&mut self, command: Arc<dyn Command>) {
        let trigger = command.trigger().to_lowercase();

        let index = match self.by_id.get(command.id()).copied() {
            Some(index) => {
                tracing::debug!("Replacing command '{}'", command.id());
                let previous = self.commands[index].trigger().to_lowercase();
                if self.by_trigger.get(&previous) == Some(&index) {
                    self.by_trigger.remove(&previous);
                }
                self.commands[index] = command;
                index
            }
            None => {
                self.commands.push(command);
                let index = self.commands.len() - 1;
                self.by_id
                    .insert(self.commands[index].id().to_string(), index);
                index
            }
        };

        if let Some(shadowed) = self.by_trigger.insert(trigger.clone(), index)
            && shadowed != index
        {
            tracing::warn!(
                "Trigger '{}' now resolves to '{}' instead of '{}'",
                trigger,
                self.commands[index].id(),
                self.commands[shadowed].id()
            );
        }
    }

    /// Case-insensitive lookup by trigger keyword.
    pub fn resolve(&self, trigger: &str) -> Option<Arc<dyn Command>> {
        self.by_trigger
            .get(&trigger.to_lowercase())
            .map(|&index| self.commands[index].clone())
    }

    pub fn resolve_by_id(&self, id: &str) -> Option<Arc<dyn Command>> {
        self.by_id.get(id).map(|&index| self.commands[index].clone())
    }

    /// Commands in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
