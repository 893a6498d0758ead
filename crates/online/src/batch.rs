//! Ordered, atomic groups of management steps.

use crate::operation::{Operation, names};
use model::{Address, ModelValue, Values};

/// One step of a [`Batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Create a resource with attributes.
    Add {
        /// Resource to create.
        address: Address,
        /// Its attributes.
        values: Values,
    },
    /// Run a named operation.
    Invoke {
        /// Operation name, e.g. `enable`.
        operation: String,
        /// Target resource.
        address: Address,
        /// Operation parameters.
        params: Values,
    },
    /// Remove a resource.
    Remove {
        /// Resource to remove.
        address: Address,
    },
    /// Write one attribute.
    WriteAttribute {
        /// Target resource.
        address: Address,
        /// Attribute name.
        name: String,
        /// New value.
        value: ModelValue,
    },
    /// Reset one attribute to undefined.
    UndefineAttribute {
        /// Target resource.
        address: Address,
        /// Attribute name.
        name: String,
    },
}

impl Step {
    /// The management request for this step.
    pub fn to_operation(&self) -> Operation {
        match self {
            Self::Add { address, values } => {
                Operation::new(names::ADD, address.clone()).with_params(values.clone())
            }
            Self::Invoke {
                operation,
                address,
                params,
            } => Operation::new(operation.clone(), address.clone()).with_params(params.clone()),
            Self::Remove { address } => Operation::new(names::REMOVE, address.clone()),
            Self::WriteAttribute {
                address,
                name,
                value,
            } => Operation::new(names::WRITE_ATTRIBUTE, address.clone()).with_params(
                Values::empty()
                    .and("name", name.clone())
                    .and("value", value.clone()),
            ),
            Self::UndefineAttribute { address, name } => {
                Operation::new(names::UNDEFINE_ATTRIBUTE, address.clone())
                    .with_params(Values::empty().and("name", name.clone()))
            }
        }
    }

    /// The resource this step targets.
    pub fn address(&self) -> &Address {
        match self {
            Self::Add { address, .. }
            | Self::Invoke { address, .. }
            | Self::Remove { address }
            | Self::WriteAttribute { address, .. }
            | Self::UndefineAttribute { address, .. } => address,
        }
    }
}

/// Steps submitted together; either all take effect or none does.
///
/// Steps run in insertion order. A batch is built up and then handed to
/// [`Operations::batch`](crate::Operations::batch).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    steps: Vec<Step>,
}

impl Batch {
    /// An empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an `add` step.
    pub fn add(&mut self, address: Address, values: Values) -> &mut Self {
        self.push(Step::Add { address, values })
    }

    /// Append a parameterless named operation.
    pub fn invoke(&mut self, operation: impl Into<String>, address: Address) -> &mut Self {
        self.invoke_with(operation, address, Values::empty())
    }

    /// Append a named operation with parameters.
    pub fn invoke_with(
        &mut self,
        operation: impl Into<String>,
        address: Address,
        params: Values,
    ) -> &mut Self {
        self.push(Step::Invoke {
            operation: operation.into(),
            address,
            params,
        })
    }

    /// Append a `remove` step.
    pub fn remove(&mut self, address: Address) -> &mut Self {
        self.push(Step::Remove { address })
    }

    /// Append a `write-attribute` step.
    pub fn write_attribute(
        &mut self,
        address: Address,
        name: impl Into<String>,
        value: impl Into<ModelValue>,
    ) -> &mut Self {
        self.push(Step::WriteAttribute {
            address,
            name: name.into(),
            value: value.into(),
        })
    }

    /// Append an `undefine-attribute` step.
    pub fn undefine_attribute(&mut self, address: Address, name: impl Into<String>) -> &mut Self {
        self.push(Step::UndefineAttribute {
            address,
            name: name.into(),
        })
    }

    /// Steps in submission order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The composite request carrying every step.
    pub fn to_operation(&self) -> Operation {
        Operation::composite(self.steps.iter().map(Step::to_operation).collect())
    }

    fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_steps_keep_order() {
        let ds = Address::subsystem("datasources").and("data-source", "DS1");
        let mut batch = Batch::new();
        batch
            .add(ds.clone(), Values::empty().and("enabled", true))
            .invoke("enable", ds.clone())
            .write_attribute(ds.clone(), "min-pool-size", 0)
            .undefine_attribute(ds.clone(), "max-pool-size")
            .remove(ds.and("connection-properties", "x"));

        let names: Vec<String> = batch
            .steps()
            .iter()
            .map(|step| step.to_operation().name)
            .collect();
        assert_eq!(
            names,
            vec![
                "add",
                "enable",
                "write-attribute",
                "undefine-attribute",
                "remove"
            ]
        );
        assert_eq!(batch.len(), 5);
    }

    #[test]
    fn test_to_operation_is_composite() {
        let mut batch = Batch::new();
        batch.add(
            Address::subsystem("datasources").and("jdbc-driver", "h2"),
            Values::empty().and("driver-name", "h2"),
        );

        let model = batch.to_operation().to_model();
        assert_eq!(model["operation"], "composite");
        assert_eq!(
            model["steps"][0],
            json!({
                "operation": "add",
                "address": [{"subsystem": "datasources"}, {"jdbc-driver": "h2"}],
                "driver-name": "h2",
            })
        );
    }

    #[test]
    fn test_write_attribute_params() {
        let address = Address::subsystem("datasources");
        let op = Step::WriteAttribute {
            address: address.clone(),
            name: "statistics-enabled".into(),
            value: ModelValue::from(true),
        }
        .to_operation();

        assert_eq!(op.address, address);
        assert_eq!(op.to_model()["value"], true);
        assert_eq!(op.to_model()["name"], "statistics-enabled");
    }
}
