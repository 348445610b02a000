use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::commands::{
    Command, CommandDescriptor, CommandOutput, MenuNode, default_registry, menu_tree,
};

use super::{Result, ViewerSession};

#[derive(Clone)]
pub struct CommandService {
    registry: HashMap<&'static str, Arc<dyn Command>>,
}

impl std::fmt::Debug for CommandService {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("CommandService")
            .field("registered_commands", &self.registry.len())
            .finish()
    }
}

impl Default for CommandService {
    fn default() -> Self {
        Self {
            registry: default_registry(),
        }
    }
}

impl CommandService {
    pub fn list(&self) -> Vec<CommandDescriptor> {
        let mut descriptors = self
            .registry
            .values()
            .map(|command| command.descriptor())
            .collect::<Vec<_>>();
        descriptors.sort_by(|left, right| left.id.cmp(&right.id));
        descriptors
    }

    pub fn menu(&self) -> Vec<MenuNode> {
        menu_tree()
    }

    /// Runs `id` through the session so failures land in its status area.
    pub fn run(
        &self,
        session: &mut ViewerSession,
        id: &str,
        params: &Value,
    ) -> Result<CommandOutput> {
        Ok(session.run_command(id, params)?)
    }
}
