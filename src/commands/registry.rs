use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::runtime::ViewerSession;

use super::{
    Command, CommandDescriptor, CommandOutput, DeleteRoiCommand, ImportRawCommand,
    InvertCommand, MeasureCommand, NextSliceCommand, OpenImageCommand, OpsError,
    OrthogonalViewsCommand, PreviousSliceCommand, Result, RoiPropertiesCommand, SmoothCommand,
};

type Registry = HashMap<&'static str, Arc<dyn Command>>;

fn register<C: Command + 'static>(map: &mut Registry, command: C) {
    map.insert(command.id(), Arc::new(command));
}

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: Registry = HashMap::new();
        register(&mut map, OpenImageCommand);
        register(&mut map, ImportRawCommand);
        register(&mut map, InvertCommand);
        register(&mut map, OrthogonalViewsCommand);
        register(&mut map, NextSliceCommand);
        register(&mut map, PreviousSliceCommand);
        register(&mut map, SmoothCommand);
        register(&mut map, MeasureCommand);
        register(&mut map, RoiPropertiesCommand);
        register(&mut map, DeleteRoiCommand);
        map
    })
}

pub fn default_registry() -> HashMap<&'static str, Arc<dyn Command>> {
    registry()
        .iter()
        .map(|(id, command)| (*id, Arc::clone(command)))
        .collect()
}

pub fn list_commands() -> Vec<CommandDescriptor> {
    let mut descriptors = registry()
        .values()
        .map(|command| command.descriptor())
        .collect::<Vec<_>>();
    descriptors.sort_by(|left, right| left.id.cmp(&right.id));
    descriptors
}

pub fn find_command(id: &str) -> Result<Arc<dyn Command>> {
    registry()
        .get(id)
        .cloned()
        .ok_or_else(|| OpsError::UnknownCommand(id.to_string()))
}

pub fn invoke_command(
    session: &mut ViewerSession,
    id: &str,
    params: &Value,
) -> Result<CommandOutput> {
    find_command(id)?.invoke(session, params)
}
