//! Convenience layer over a [`Client`].

use crate::batch::Batch;
use crate::client::Client;
use crate::error::{Error, Result};
use crate::operation::{ModelNodeResult, Operation, names};
use model::{Address, ModelValue, Values};

/// Common management operations against one server.
///
/// Reads return the raw [`ModelNodeResult`]; mutations fail with
/// [`Error::Failed`] when the server reports a failed outcome.
#[derive(Clone, Copy)]
pub struct Operations<'a> {
    client: &'a dyn Client,
}

impl<'a> Operations<'a> {
    /// Wrap a client.
    pub fn new(client: &'a dyn Client) -> Self {
        Self { client }
    }

    /// The wrapped client.
    pub fn client(&self) -> &'a dyn Client {
        self.client
    }

    /// Send one request as is.
    pub fn execute(&self, operation: &Operation) -> Result<ModelNodeResult> {
        log::trace!("executing {} on {}", operation.name, operation.address);
        self.client.execute(operation)
    }

    /// Whether a resource exists.
    ///
    /// Asks the parent for its children of the address' type, so a missing
    /// parent also reads as "does not exist".
    pub fn exists(&self, address: &Address) -> Result<bool> {
        let (Some(parent), Some(last)) = (address.parent(), address.last()) else {
            return Ok(true);
        };
        let result = self.read_children_names(&parent, &last.kind)?;
        if result.is_failed() {
            return Ok(false);
        }
        Ok(result
            .string_list_value()
            .is_some_and(|names| names.iter().any(|name| *name == last.name)))
    }

    /// Create a resource.
    pub fn add(&self, address: &Address, values: &Values) -> Result<ModelNodeResult> {
        let op = Operation::new(names::ADD, address.clone()).with_params(values.clone());
        self.mutate(&op)
    }

    /// Remove a resource; fails if it does not exist.
    pub fn remove(&self, address: &Address) -> Result<ModelNodeResult> {
        self.mutate(&Operation::new(names::REMOVE, address.clone()))
    }

    /// Remove a resource if present. Returns whether something was removed.
    pub fn remove_if_exists(&self, address: &Address) -> Result<bool> {
        if !self.exists(address)? {
            return Ok(false);
        }
        self.remove(address)?;
        Ok(true)
    }

    /// Read one attribute.
    pub fn read_attribute(&self, address: &Address, name: &str) -> Result<ModelNodeResult> {
        self.execute(
            &Operation::new(names::READ_ATTRIBUTE, address.clone())
                .with_params(Values::empty().and("name", name)),
        )
    }

    /// Read all attributes of a resource.
    pub fn read_resource(&self, address: &Address) -> Result<ModelNodeResult> {
        self.execute(&Operation::new(names::READ_RESOURCE, address.clone()))
    }

    /// Names of the children of `child_type` under `address`.
    pub fn read_children_names(&self, address: &Address, child_type: &str) -> Result<ModelNodeResult> {
        self.execute(
            &Operation::new(names::READ_CHILDREN_NAMES, address.clone())
                .with_params(Values::empty().and("child-type", child_type)),
        )
    }

    /// Write one attribute.
    pub fn write_attribute(
        &self,
        address: &Address,
        name: &str,
        value: impl Into<ModelValue>,
    ) -> Result<ModelNodeResult> {
        let params = Values::empty().and("name", name).and("value", value);
        self.mutate(&Operation::new(names::WRITE_ATTRIBUTE, address.clone()).with_params(params))
    }

    /// Reset one attribute to undefined.
    pub fn undefine_attribute(&self, address: &Address, name: &str) -> Result<ModelNodeResult> {
        self.mutate(
            &Operation::new(names::UNDEFINE_ATTRIBUTE, address.clone())
                .with_params(Values::empty().and("name", name)),
        )
    }

    /// Run an arbitrary named operation, failing on a failed outcome.
    pub fn invoke(&self, name: &str, address: &Address, params: &Values) -> Result<ModelNodeResult> {
        self.mutate(&Operation::new(name, address.clone()).with_params(params.clone()))
    }

    /// Submit all steps as one composite request.
    ///
    /// Either every step takes effect or none does. An empty batch sends
    /// nothing.
    pub fn batch(&self, batch: &Batch) -> Result<ModelNodeResult> {
        if batch.is_empty() {
            return Ok(ModelNodeResult::success(None));
        }
        log::debug!("submitting batch of {} step(s)", batch.len());
        self.mutate(&batch.to_operation())
    }

    fn mutate(&self, operation: &Operation) -> Result<ModelNodeResult> {
        let result = self.execute(operation)?;
        match result.failure_description() {
            Some(description) => Err(Error::Failed {
                operation: operation.name.clone(),
                address: operation.address.to_string(),
                description: description.to_string(),
            }),
            None => Ok(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockClient;
    use model::ManagementVersion;

    fn driver(name: &str) -> Address {
        Address::subsystem("datasources").and("jdbc-driver", name)
    }

    #[test]
    fn test_exists() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let ops = Operations::new(&client);

        assert!(ops.exists(&Address::root()).unwrap());
        assert!(ops.exists(&Address::subsystem("datasources")).unwrap());
        assert!(!ops.exists(&driver("h2")).unwrap());

        ops.add(&driver("h2"), &Values::empty().and("driver-name", "h2"))
            .unwrap();
        assert!(ops.exists(&driver("h2")).unwrap());
    }

    #[test]
    fn test_exists_with_missing_parent() {
        let client = MockClient::new(ManagementVersion::VERSION_2_1_0);
        let ops = Operations::new(&client);
        assert!(!ops.exists(&driver("h2")).unwrap());
    }

    #[test]
    fn test_add_failure_is_error() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let ops = Operations::new(&client);
        ops.add(&driver("h2"), &Values::empty()).unwrap();

        let err = ops.add(&driver("h2"), &Values::empty()).unwrap_err();
        assert!(matches!(err, Error::Failed { .. }));
        assert!(err.failure_description().unwrap().contains("Duplicate"));
    }

    #[test]
    fn test_remove_if_exists() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let ops = Operations::new(&client);

        assert!(!ops.remove_if_exists(&driver("h2")).unwrap());
        ops.add(&driver("h2"), &Values::empty()).unwrap();
        assert!(ops.remove_if_exists(&driver("h2")).unwrap());
        assert!(!client.contains(&driver("h2")));
    }

    #[test]
    fn test_attribute_roundtrip() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let ops = Operations::new(&client);
        ops.add(&driver("h2"), &Values::empty()).unwrap();

        ops.write_attribute(&driver("h2"), "driver-module-name", "com.h2database.h2")
            .unwrap();
        let read = ops.read_attribute(&driver("h2"), "driver-module-name").unwrap();
        assert_eq!(read.string_value().as_deref(), Some("com.h2database.h2"));

        ops.undefine_attribute(&driver("h2"), "driver-module-name")
            .unwrap();
        let read = ops.read_attribute(&driver("h2"), "driver-module-name").unwrap();
        assert!(read.is_success());
        assert!(read.value().is_none());
    }

    #[test]
    fn test_batch_is_atomic() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let ops = Operations::new(&client);

        let mut batch = Batch::new();
        batch.add(driver("a"), Values::empty());
        batch.add(driver("a"), Values::empty());

        let err = ops.batch(&batch).unwrap_err();
        assert!(matches!(err, Error::Failed { .. }));
        assert!(!client.contains(&driver("a")));
    }

    #[test]
    fn test_empty_batch_sends_nothing() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let ops = Operations::new(&client);

        assert!(ops.batch(&Batch::new()).unwrap().is_success());
        assert!(client.history().is_empty());
    }
}
