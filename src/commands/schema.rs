use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::runtime::ViewerSession;

use super::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub kind: String,
}

impl ParamSpec {
    pub fn new(name: &str, description: &str, required: bool, kind: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required,
            kind: kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandDescriptor {
    pub id: String,
    pub label: String,
    pub description: String,
    pub params: Vec<ParamSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MeasurementTable {
    pub values: BTreeMap<String, Value>,
}

impl MeasurementTable {
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CommandOutput {
    pub message: String,
    pub measurements: Option<MeasurementTable>,
}

impl CommandOutput {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            measurements: None,
        }
    }

    pub fn with_measurements(message: impl Into<String>, measurements: MeasurementTable) -> Self {
        Self {
            message: message.into(),
            measurements: Some(measurements),
        }
    }
}

/// A menu or context action. Commands act on the session they are invoked
/// with and never keep state of their own.
pub trait Command: Send + Sync {
    fn id(&self) -> &'static str;
    fn descriptor(&self) -> CommandDescriptor;
    fn invoke(&self, session: &mut ViewerSession, params: &Value) -> Result<CommandOutput>;
}
