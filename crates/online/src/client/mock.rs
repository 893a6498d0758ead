//! In-memory management server.
//!
//! [`MockClient`] keeps a resource tree keyed by [`Address`] and answers the
//! subset of operations the engine issues, with the same failure behavior a
//! real server shows:
//!
//! - `add` fails for duplicates and for missing ancestors
//! - `remove` fails for missing resources and removes children recursively
//! - `composite` runs on a copy of the tree and commits only when every step
//!   succeeded, otherwise the result is failed and rolled back
//! - below management version 2.0.0, adding a resource with `enabled=true`
//!   does not start it and an explicit `enable` is required; from 2.0.0 on,
//!   the resource starts on add and `enable` on it fails

use crate::client::Client;
use crate::error::Result;
use crate::operation::{ModelNodeResult, Operation, names};
use model::{Address, ManagementVersion, Values};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

/// Attributes of a resource.
type Attributes = Map<String, Value>;

#[derive(Debug, Clone, Default)]
struct Tree {
    resources: BTreeMap<Address, Attributes>,
    started: BTreeSet<Address>,
}

/// In-memory server for tests and dry runs.
#[derive(Debug)]
pub struct MockClient {
    version: ManagementVersion,
    tree: Mutex<Tree>,
    history: Mutex<Vec<Operation>>,
}

impl MockClient {
    /// An empty server: only the root resource exists.
    #[must_use]
    pub fn new(version: ManagementVersion) -> Self {
        let mut root = Attributes::new();
        root.insert("management-major-version".into(), json!(version.major));
        root.insert("management-minor-version".into(), json!(version.minor));
        root.insert("management-micro-version".into(), json!(version.micro));
        root.insert("server-state".into(), json!("running"));

        let mut tree = Tree::default();
        tree.resources.insert(Address::root(), root);

        Self {
            version,
            tree: Mutex::new(tree),
            history: Mutex::new(Vec::new()),
        }
    }

    /// A server with the containers a standalone configuration always has.
    #[must_use]
    pub fn standalone(version: ManagementVersion) -> Self {
        Self::new(version)
            .with_resource(Address::subsystem("datasources"), Values::empty())
            .with_resource(Address::core_service("management"), Values::empty())
    }

    /// Seed a resource, ancestors are not checked.
    #[must_use]
    pub fn with_resource(self, address: Address, attributes: Values) -> Self {
        self.lock_tree()
            .resources
            .insert(address, object(attributes.to_json()));
        self
    }

    /// The management version this server reports.
    pub fn version(&self) -> ManagementVersion {
        self.version
    }

    /// Attributes of a resource, `None` if absent.
    pub fn resource(&self, address: &Address) -> Option<Value> {
        self.lock_tree()
            .resources
            .get(address)
            .cloned()
            .map(Value::Object)
    }

    /// Whether a resource exists.
    pub fn contains(&self, address: &Address) -> bool {
        self.lock_tree().resources.contains_key(address)
    }

    /// Whether a resource is started.
    pub fn is_started(&self, address: &Address) -> bool {
        self.lock_tree().started.contains(address)
    }

    /// Number of resources, the root included.
    pub fn resource_count(&self) -> usize {
        self.lock_tree().resources.len()
    }

    /// Set the `server-state` root attribute, e.g. `reload-required`.
    pub fn set_server_state(&self, state: &str) {
        if let Some(root) = self.lock_tree().resources.get_mut(&Address::root()) {
            root.insert("server-state".into(), json!(state));
        }
    }

    /// Every request executed so far, oldest first.
    pub fn history(&self) -> Vec<Operation> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_tree(&self) -> MutexGuard<'_, Tree> {
        match self.tree.lock() {
            Ok(tree) => tree,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, operation: &Operation) {
        match self.history.lock() {
            Ok(mut history) => history.push(operation.clone()),
            Err(poisoned) => poisoned.into_inner().push(operation.clone()),
        }
    }

    fn dispatch(&self, tree: &mut Tree, op: &Operation) -> ModelNodeResult {
        match op.name.as_str() {
            names::COMPOSITE => self.composite(tree, &op.steps),
            names::ADD => self.add(tree, &op.address, &op.params),
            names::REMOVE => remove(tree, &op.address),
            names::READ_RESOURCE => match tree.resources.get(&op.address) {
                Some(attributes) => ModelNodeResult::success(Some(Value::Object(attributes.clone()))),
                None => not_found(&op.address),
            },
            names::READ_CHILDREN_NAMES => read_children_names(tree, op),
            names::READ_ATTRIBUTE => read_attribute(tree, op),
            names::WRITE_ATTRIBUTE => write_attribute(tree, op),
            names::UNDEFINE_ATTRIBUTE => undefine_attribute(tree, op),
            names::ENABLE => enable(tree, &op.address),
            names::DISABLE => disable(tree, &op.address),
            names::RELOAD if op.address.is_root() => {
                if let Some(root) = tree.resources.get_mut(&Address::root()) {
                    root.insert("server-state".into(), json!("running"));
                }
                ModelNodeResult::success(None)
            }
            other => ModelNodeResult::failed(format!(
                "WFLYCTL0031: No operation named '{other}' exists at address {}",
                op.address
            )),
        }
    }

    fn composite(&self, tree: &mut Tree, steps: &[Operation]) -> ModelNodeResult {
        let mut working = tree.clone();
        let mut results = Map::new();

        for (index, step) in steps.iter().enumerate() {
            let result = self.dispatch(&mut working, step);
            if let Some(description) = result.failure_description() {
                return ModelNodeResult::failed(format!(
                    "WFLYCTL0062: Composite operation failed and was rolled back. \
                     Steps that failed: step-{}: {description}",
                    index + 1
                ))
                .rolled_back();
            }
            results.insert(
                format!("step-{}", index + 1),
                json!({"outcome": "success", "result": result.value()}),
            );
        }

        *tree = working;
        ModelNodeResult::success(Some(Value::Object(results)))
    }

    fn add(&self, tree: &mut Tree, address: &Address, params: &Values) -> ModelNodeResult {
        let Some(parent) = address.parent() else {
            return ModelNodeResult::failed("WFLYCTL0212: Duplicate resource [/]");
        };
        if tree.resources.contains_key(address) {
            return ModelNodeResult::failed(format!("WFLYCTL0212: Duplicate resource {address}"));
        }
        if !tree.resources.contains_key(&parent) {
            return ModelNodeResult::failed(format!(
                "WFLYCTL0175: Resource {parent} does not exist; a resource at address \
                 {address} cannot be created until all ancestor resources have been added"
            ));
        }

        let attributes = object(params.to_json());
        let enabled = attributes.get("enabled").and_then(Value::as_bool) == Some(true);
        tree.resources.insert(address.clone(), attributes);
        if enabled && self.version.greater_than_or_equal_to(ManagementVersion::VERSION_2_0_0) {
            tree.started.insert(address.clone());
        }
        ModelNodeResult::success(None)
    }
}

impl Client for MockClient {
    fn execute(&self, operation: &Operation) -> Result<ModelNodeResult> {
        self.record(operation);
        let mut tree = self.lock_tree();
        let result = self.dispatch(&mut tree, operation);
        log::debug!(
            "mock {} {} -> {}",
            operation.name,
            operation.address,
            if result.is_success() { "success" } else { "failed" }
        );
        Ok(result)
    }

    fn describe(&self) -> String {
        format!("in-memory server {}", self.version)
    }
}

fn object(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        _ => Attributes::new(),
    }
}

fn not_found(address: &Address) -> ModelNodeResult {
    ModelNodeResult::failed(format!(
        "WFLYCTL0216: Management resource '{address}' not found"
    ))
}

fn string_param<'a>(op: &'a Operation, name: &str) -> Option<&'a str> {
    op.params.get(name).and_then(|value| value.as_str())
}

fn remove(tree: &mut Tree, address: &Address) -> ModelNodeResult {
    if address.is_root() || !tree.resources.contains_key(address) {
        return not_found(address);
    }
    tree.resources.retain(|key, _| !key.starts_with(address));
    tree.started.retain(|key| !key.starts_with(address));
    ModelNodeResult::success(None)
}

fn read_children_names(tree: &Tree, op: &Operation) -> ModelNodeResult {
    if !tree.resources.contains_key(&op.address) {
        return not_found(&op.address);
    }
    let Some(child_type) = string_param(op, "child-type") else {
        return ModelNodeResult::failed("WFLYCTL0155: 'child-type' may not be null");
    };
    let depth = op.address.segments().len() + 1;
    let names: Vec<Value> = tree
        .resources
        .keys()
        .filter(|key| key.segments().len() == depth && key.starts_with(&op.address))
        .filter_map(|key| key.last())
        .filter(|segment| segment.kind == child_type)
        .map(|segment| json!(segment.name))
        .collect();
    ModelNodeResult::success(Some(Value::Array(names)))
}

fn read_attribute(tree: &Tree, op: &Operation) -> ModelNodeResult {
    let Some(attributes) = tree.resources.get(&op.address) else {
        return not_found(&op.address);
    };
    let Some(name) = string_param(op, "name") else {
        return ModelNodeResult::failed("WFLYCTL0155: 'name' may not be null");
    };
    ModelNodeResult::success(attributes.get(name).cloned())
}

fn write_attribute(tree: &mut Tree, op: &Operation) -> ModelNodeResult {
    let Some(name) = string_param(op, "name").map(ToString::to_string) else {
        return ModelNodeResult::failed("WFLYCTL0155: 'name' may not be null");
    };
    let value = op
        .params
        .get("value")
        .map_or(Value::Null, |value| value.to_json());
    match tree.resources.get_mut(&op.address) {
        Some(attributes) => {
            attributes.insert(name, value);
            ModelNodeResult::success(None)
        }
        None => not_found(&op.address),
    }
}

fn undefine_attribute(tree: &mut Tree, op: &Operation) -> ModelNodeResult {
    let Some(name) = string_param(op, "name") else {
        return ModelNodeResult::failed("WFLYCTL0155: 'name' may not be null");
    };
    match tree.resources.get_mut(&op.address) {
        Some(attributes) => {
            attributes.remove(name);
            ModelNodeResult::success(None)
        }
        None => not_found(&op.address),
    }
}

fn enable(tree: &mut Tree, address: &Address) -> ModelNodeResult {
    let Some(attributes) = tree.resources.get_mut(address) else {
        return not_found(address);
    };
    if tree.started.contains(address) {
        return ModelNodeResult::failed(format!("Resource {address} is already enabled"));
    }
    attributes.insert("enabled".into(), json!(true));
    tree.started.insert(address.clone());
    ModelNodeResult::success(None)
}

fn disable(tree: &mut Tree, address: &Address) -> ModelNodeResult {
    let Some(attributes) = tree.resources.get_mut(address) else {
        return not_found(address);
    };
    attributes.insert("enabled".into(), json!(false));
    tree.started.remove(address);
    ModelNodeResult::success(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datasource(name: &str) -> Address {
        Address::subsystem("datasources").and("data-source", name)
    }

    fn add(address: Address, params: Values) -> Operation {
        Operation::new(names::ADD, address).with_params(params)
    }

    #[test]
    fn test_add_and_read() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let result = client
            .execute(&add(datasource("DS1"), Values::empty().and("jndi-name", "java:/DS1")))
            .unwrap();

        assert!(result.is_success());
        assert_eq!(
            client.resource(&datasource("DS1")).unwrap()["jndi-name"],
            "java:/DS1"
        );
    }

    #[test]
    fn test_add_duplicate_fails() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        client.execute(&add(datasource("DS1"), Values::empty())).unwrap();
        let again = client.execute(&add(datasource("DS1"), Values::empty())).unwrap();

        assert!(again.is_failed());
        assert!(again.failure_description().unwrap().contains("Duplicate"));
    }

    #[test]
    fn test_add_without_parent_fails() {
        let client = MockClient::new(ManagementVersion::VERSION_2_1_0);
        let result = client.execute(&add(datasource("DS1"), Values::empty())).unwrap();
        assert!(result.is_failed());
        assert!(!client.contains(&datasource("DS1")));
    }

    #[test]
    fn test_remove_is_recursive() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        client.execute(&add(datasource("DS1"), Values::empty())).unwrap();
        client
            .execute(&add(
                datasource("DS1").and("connection-properties", "x"),
                Values::empty().and("value", "1"),
            ))
            .unwrap();

        let result = client
            .execute(&Operation::new(names::REMOVE, datasource("DS1")))
            .unwrap();

        assert!(result.is_success());
        assert!(!client.contains(&datasource("DS1").and("connection-properties", "x")));
    }

    #[test]
    fn test_remove_missing_fails() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let result = client
            .execute(&Operation::new(names::REMOVE, datasource("nope")))
            .unwrap();
        assert!(result.is_failed());
    }

    #[test]
    fn test_composite_rolls_back_on_failure() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        let before = client.resource_count();

        let result = client
            .execute(&Operation::composite(vec![
                add(datasource("DS1"), Values::empty()),
                add(datasource("DS1"), Values::empty()),
            ]))
            .unwrap();

        assert!(result.is_failed());
        assert!(result.is_rolled_back());
        assert!(result.failure_description().unwrap().contains("step-2"));
        assert_eq!(client.resource_count(), before);
    }

    #[test]
    fn test_legacy_enable_requires_explicit_invoke() {
        let client = MockClient::standalone(ManagementVersion::VERSION_1_6_0);
        client
            .execute(&add(datasource("DS1"), Values::empty().and("enabled", true)))
            .unwrap();
        assert!(!client.is_started(&datasource("DS1")));

        let result = client
            .execute(&Operation::new(names::ENABLE, datasource("DS1")))
            .unwrap();
        assert!(result.is_success());
        assert!(client.is_started(&datasource("DS1")));
    }

    #[test]
    fn test_enable_already_enabled_fails() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_0_0);
        client
            .execute(&add(datasource("DS1"), Values::empty().and("enabled", true)))
            .unwrap();
        assert!(client.is_started(&datasource("DS1")));

        let result = client
            .execute(&Operation::new(names::ENABLE, datasource("DS1")))
            .unwrap();
        assert!(result.is_failed());
    }

    #[test]
    fn test_read_children_names() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        client.execute(&add(datasource("A"), Values::empty())).unwrap();
        client.execute(&add(datasource("B"), Values::empty())).unwrap();
        client
            .execute(&add(
                Address::subsystem("datasources").and("jdbc-driver", "h2"),
                Values::empty(),
            ))
            .unwrap();

        let op = Operation::new(names::READ_CHILDREN_NAMES, Address::subsystem("datasources"))
            .with_params(Values::empty().and("child-type", "data-source"));
        let names = client.execute(&op).unwrap().string_list_value().unwrap();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_write_and_undefine_attribute() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        client.execute(&add(datasource("DS1"), Values::empty())).unwrap();

        let write = Operation::new(names::WRITE_ATTRIBUTE, datasource("DS1"))
            .with_params(Values::empty().and("name", "min-pool-size").and("value", 0));
        assert!(client.execute(&write).unwrap().is_success());
        assert_eq!(client.resource(&datasource("DS1")).unwrap()["min-pool-size"], 0);

        let undefine = Operation::new(names::UNDEFINE_ATTRIBUTE, datasource("DS1"))
            .with_params(Values::empty().and("name", "min-pool-size"));
        assert!(client.execute(&undefine).unwrap().is_success());
        assert!(client.resource(&datasource("DS1")).unwrap().get("min-pool-size").is_none());
    }

    #[test]
    fn test_unknown_operation_fails() {
        let client = MockClient::new(ManagementVersion::VERSION_2_1_0);
        let result = client
            .execute(&Operation::new("frobnicate", Address::root()))
            .unwrap();
        assert!(result.is_failed());
    }

    #[test]
    fn test_history_records_requests() {
        let client = MockClient::standalone(ManagementVersion::VERSION_2_1_0);
        client.execute(&add(datasource("DS1"), Values::empty())).unwrap();
        let history = client.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].name, "add");
    }
}
