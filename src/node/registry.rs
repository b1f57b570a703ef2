//! Node registration and execution.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::image::{ImageTensor, LatentTensor};

use super::schema::{InputSpec, OutputSpec};
use super::value::Value;

/// The single function a node runs.
pub type EntryPoint = fn(&NodeInputs, &Config) -> Result<Vec<Value>>;

/// Everything the host needs to show and run a node.
#[derive(Debug, Clone, Serialize)]
pub struct NodeDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub inputs: Vec<InputSpec>,
    pub outputs: Vec<OutputSpec>,
    /// Nodes with side effects the host always runs.
    pub output_node: bool,
    #[serde(skip)]
    pub entry: EntryPoint,
}

/// Checked inputs handed to an entry point.
#[derive(Debug, Default)]
pub struct NodeInputs {
    node: &'static str,
    values: HashMap<&'static str, Value>,
}

impl NodeInputs {
    fn missing(&self, name: &str) -> Error {
        Error::MissingInput {
            node: self.node.to_string(),
            name: name.to_string(),
        }
    }

    fn mismatch(name: &str, expected: &'static str, value: &Value) -> Error {
        Error::InputType {
            name: name.to_string(),
            expected,
            actual: value.value_type().into(),
        }
    }

    /// Raw access to an input.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// # Errors
    ///
    /// Returns an error if the input is absent or not an integer.
    pub fn int(&self, name: &str) -> Result<i128> {
        match self.get(name) {
            Some(Value::Int(v)) => Ok(*v),
            Some(other) => Err(Self::mismatch(name, "INT", other)),
            None => Err(self.missing(name)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the input is absent or not a float.
    pub fn float(&self, name: &str) -> Result<f64> {
        match self.get(name) {
            Some(Value::Float(v)) => Ok(*v),
            Some(other) => Err(Self::mismatch(name, "FLOAT", other)),
            None => Err(self.missing(name)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the input is absent or not a string.
    pub fn string(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(Value::String(v)) => Ok(v),
            Some(other) => Err(Self::mismatch(name, "STRING", other)),
            None => Err(self.missing(name)),
        }
    }

    /// # Errors
    ///
    /// Returns an error if the input is absent or not a boolean.
    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            Some(Value::Boolean(v)) => Ok(*v),
            Some(other) => Err(Self::mismatch(name, "BOOLEAN", other)),
            None => Err(self.missing(name)),
        }
    }

    /// Integer input narrowed to `u32`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is absent, not an integer, or does not
    /// fit.
    pub fn u32(&self, name: &str) -> Result<u32> {
        let v = self.int(name)?;
        u32::try_from(v).map_err(|_| Error::invalid(name, format!("{v} does not fit in u32")))
    }

    /// Integer input narrowed to `u8`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is absent, not an integer, or does not
    /// fit.
    pub fn u8(&self, name: &str) -> Result<u8> {
        let v = self.int(name)?;
        u8::try_from(v).map_err(|_| Error::invalid(name, format!("{v} does not fit in u8")))
    }

    /// An optional image input. Unconnected inputs are `None`.
    #[must_use]
    pub fn image(&self, name: &str) -> Option<&ImageTensor> {
        match self.get(name) {
            Some(Value::Image(t)) => Some(t),
            _ => None,
        }
    }

    /// An optional latent input. Unconnected inputs are `None`.
    #[must_use]
    pub fn latent(&self, name: &str) -> Option<&LatentTensor> {
        match self.get(name) {
            Some(Value::Latent(t)) => Some(t),
            _ => None,
        }
    }
}

/// Lookup table of every registered node, ordered by name.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: BTreeMap<&'static str, NodeDescriptor>,
}

impl NodeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every node shipped with this crate.
    ///
    /// # Errors
    ///
    /// Returns an error if two built-in nodes share a name.
    pub fn with_builtin_nodes() -> Result<Self> {
        let mut registry = Self::new();
        for descriptor in crate::nodes::builtin_nodes() {
            registry.register(descriptor)?;
        }
        tracing::debug!("registered {} nodes", registry.len());
        Ok(registry)
    }

    /// Add a node.
    ///
    /// # Errors
    ///
    /// Returns an error if a node with the same name is already registered.
    pub fn register(&mut self, descriptor: NodeDescriptor) -> Result<()> {
        if self.nodes.contains_key(descriptor.name) {
            return Err(Error::DuplicateNode(descriptor.name.to_string()));
        }
        self.nodes.insert(descriptor.name, descriptor);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&NodeDescriptor> {
        self.nodes.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeDescriptor> {
        self.nodes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every descriptor keyed by node name, for the host's node listing.
    ///
    /// # Errors
    ///
    /// Returns an error if a descriptor cannot be serialized.
    pub fn schema(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(&self.nodes)
    }

    /// Check `inputs` against the node's declared inputs and run it.
    ///
    /// Absent inputs take their declared default; absent optional inputs
    /// without a default stay unset. Unknown inputs are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown node, a missing required input, a type
    /// mismatch, an out-of-range value, or whatever the node itself reports.
    pub fn execute(
        &self,
        name: &str,
        mut inputs: HashMap<String, Value>,
        config: &Config,
    ) -> Result<Vec<Value>> {
        let descriptor = self
            .get(name)
            .ok_or_else(|| Error::UnknownNode(name.to_string()))?;

        let mut checked = NodeInputs {
            node: descriptor.name,
            values: HashMap::with_capacity(descriptor.inputs.len()),
        };

        for spec in &descriptor.inputs {
            let value = match inputs.remove(spec.name) {
                Some(value) => spec.accept(value)?,
                None => match &spec.default {
                    Some(default) => Value::from(default.clone()),
                    None if spec.required => return Err(checked.missing(spec.name)),
                    None => continue,
                },
            };
            checked.values.insert(spec.name, value);
        }

        for unknown in inputs.keys() {
            tracing::warn!("ignoring unknown input {unknown:?} for node {name}");
        }

        let outputs = (descriptor.entry)(&checked, config)?;

        let produced: Vec<_> = outputs.iter().map(Value::value_type).collect();
        let declared: Vec<_> = descriptor.outputs.iter().map(|o| o.value_type).collect();
        if produced != declared {
            return Err(Error::ShapeMismatch {
                expected: format!("{name} outputs {declared:?}"),
                actual: format!("{produced:?}"),
            });
        }

        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ValueType;

    fn add(inputs: &NodeInputs, _config: &Config) -> Result<Vec<Value>> {
        Ok(vec![Value::Int(inputs.int("a")? + inputs.int("b")?)])
    }

    fn adder() -> NodeDescriptor {
        NodeDescriptor {
            name: "Add",
            display_name: "Add",
            category: "test",
            description: "Adds two integers.",
            inputs: vec![
                InputSpec::int("a").range(0, 10),
                InputSpec::int("b").default(1).optional(),
            ],
            outputs: vec![OutputSpec::new("sum", ValueType::Int)],
            output_node: false,
            entry: add,
        }
    }

    #[test]
    fn test_execute_fills_defaults() {
        let mut registry = NodeRegistry::new();
        registry.register(adder()).unwrap();

        let inputs = HashMap::from([("a".to_string(), Value::Int(4))]);
        let outputs = registry.execute("Add", inputs, &Config::default()).unwrap();
        assert_eq!(outputs, vec![Value::Int(5)]);
    }

    #[test]
    fn test_execute_rejects_missing_and_out_of_range() {
        let mut registry = NodeRegistry::new();
        registry.register(adder()).unwrap();
        let config = Config::default();

        assert!(matches!(
            registry.execute("Add", HashMap::new(), &config),
            Err(Error::MissingInput { .. })
        ));

        let inputs = HashMap::from([("a".to_string(), Value::Int(11))]);
        assert!(matches!(
            registry.execute("Add", inputs, &config),
            Err(Error::InvalidParameter { .. })
        ));

        assert!(matches!(
            registry.execute("Subtract", HashMap::new(), &config),
            Err(Error::UnknownNode(_))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = NodeRegistry::new();
        registry.register(adder()).unwrap();
        assert!(matches!(
            registry.register(adder()),
            Err(Error::DuplicateNode(_))
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_schema_lists_nodes() {
        let mut registry = NodeRegistry::new();
        registry.register(adder()).unwrap();
        let schema = registry.schema().unwrap();
        assert_eq!(schema["Add"]["inputs"][1]["default"], 1);
        assert_eq!(schema["Add"]["outputs"][0]["type"], "INT");
        assert!(schema["Add"].get("entry").is_none());
    }
}
