//! Management requests and their results.

use crate::error::{Error, Result};
use model::{Address, Values};
use serde_json::{Map, Value};

/// Well-known operation names.
pub mod names {
    /// Create a resource.
    pub const ADD: &str = "add";
    /// Delete a resource and its children.
    pub const REMOVE: &str = "remove";
    /// Read a resource's attributes.
    pub const READ_RESOURCE: &str = "read-resource";
    /// List names of children of one type.
    pub const READ_CHILDREN_NAMES: &str = "read-children-names";
    /// Read one attribute.
    pub const READ_ATTRIBUTE: &str = "read-attribute";
    /// Write one attribute.
    pub const WRITE_ATTRIBUTE: &str = "write-attribute";
    /// Reset one attribute to undefined.
    pub const UNDEFINE_ATTRIBUTE: &str = "undefine-attribute";
    /// Start a resource.
    pub const ENABLE: &str = "enable";
    /// Stop a resource.
    pub const DISABLE: &str = "disable";
    /// Reload the server.
    pub const RELOAD: &str = "reload";
    /// Several steps as one atomic unit.
    pub const COMPOSITE: &str = "composite";
}

/// A single management request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Operation name, e.g. `add`.
    pub name: String,
    /// Target resource.
    pub address: Address,
    /// Operation parameters; for `add` these are the resource attributes.
    pub params: Values,
    /// Steps of a composite operation, empty otherwise.
    pub steps: Vec<Operation>,
}

impl Operation {
    /// An operation without parameters.
    pub fn new(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            address,
            params: Values::empty(),
            steps: Vec::new(),
        }
    }

    /// Attach parameters.
    pub fn with_params(mut self, params: Values) -> Self {
        self.params = params;
        self
    }

    /// A composite operation on the root wrapping `steps`.
    pub fn composite(steps: Vec<Operation>) -> Self {
        Self {
            name: names::COMPOSITE.to_string(),
            address: Address::root(),
            params: Values::empty(),
            steps,
        }
    }

    /// Whether this wraps other operations.
    pub fn is_composite(&self) -> bool {
        self.name == names::COMPOSITE
    }

    /// The JSON request body.
    pub fn to_model(&self) -> Value {
        let mut body = Map::new();
        body.insert("operation".into(), Value::String(self.name.clone()));
        body.insert("address".into(), self.address.to_model());
        for (name, value) in self.params.iter() {
            body.insert(name.to_string(), value.to_json());
        }
        if self.is_composite() {
            body.insert(
                "steps".into(),
                Value::Array(self.steps.iter().map(Operation::to_model).collect()),
            );
        }
        Value::Object(body)
    }
}

/// Outcome of a management request.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNodeResult {
    success: bool,
    value: Option<Value>,
    failure_description: Option<String>,
    rolled_back: bool,
}

impl ModelNodeResult {
    /// A successful outcome; `null` counts as undefined.
    pub fn success(value: Option<Value>) -> Self {
        Self {
            success: true,
            value: value.filter(|v| !v.is_null()),
            failure_description: None,
            rolled_back: false,
        }
    }

    /// A failed outcome.
    pub fn failed(description: impl Into<String>) -> Self {
        Self {
            success: false,
            value: None,
            failure_description: Some(description.into()),
            rolled_back: false,
        }
    }

    /// Mark the outcome as rolled back.
    pub fn rolled_back(mut self) -> Self {
        self.rolled_back = true;
        self
    }

    /// Parse a management response body.
    ///
    /// `{"outcome": "success", "result": ...}` or
    /// `{"outcome": "failed", "failure-description": ..., "rolled-back": true}`.
    pub fn from_response(response: Value) -> Result<Self> {
        let Value::Object(mut body) = response else {
            return Err(Error::InvalidResponse(format!(
                "expected a JSON object, got {response}"
            )));
        };

        let outcome = body
            .get("outcome")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidResponse("response has no 'outcome'".into()))?
            .to_string();
        let rolled_back = body
            .get("rolled-back")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let result = match outcome.as_str() {
            "success" => Self::success(body.remove("result")),
            "failed" | "cancelled" => {
                let description = match body.remove("failure-description") {
                    Some(Value::String(text)) => text,
                    Some(other) => other.to_string(),
                    None => format!("operation {outcome}"),
                };
                Self::failed(description)
            }
            other => {
                return Err(Error::InvalidResponse(format!("unknown outcome '{other}'")));
            }
        };

        Ok(if rolled_back { result.rolled_back() } else { result })
    }

    /// Whether the outcome is success.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Whether the outcome is failure.
    pub fn is_failed(&self) -> bool {
        !self.success
    }

    /// Whether the server rolled back the changes of a failed request.
    pub fn is_rolled_back(&self) -> bool {
        self.rolled_back
    }

    /// Failure description of a failed outcome.
    pub fn failure_description(&self) -> Option<&str> {
        self.failure_description.as_deref()
    }

    /// Fail unless the outcome is success. Check this before reading values.
    pub fn assert_success(&self) -> Result<&Self> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::Outcome(
                self.failure_description
                    .clone()
                    .unwrap_or_else(|| "no failure description".into()),
            ))
        }
    }

    /// Result value; `None` when undefined.
    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Result as text. Numbers and booleans are rendered.
    pub fn string_value(&self) -> Option<String> {
        match self.value.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Result as boolean; accepts `"true"`/`"false"`.
    pub fn bool_value(&self) -> Option<bool> {
        match self.value.as_ref()? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Result as integer; accepts numeric strings.
    pub fn int_value(&self) -> Option<i64> {
        match self.value.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Result as a list of strings.
    pub fn string_list_value(&self) -> Option<Vec<String>> {
        self.value.as_ref()?.as_array().map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(ToString::to_string))
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_model() {
        let op = Operation::new(names::ADD, Address::subsystem("datasources").and("jdbc-driver", "h2"))
            .with_params(Values::empty().and("driver-name", "h2").and_optional("module-slot", None::<String>));

        assert_eq!(
            op.to_model(),
            json!({
                "operation": "add",
                "address": [{"subsystem": "datasources"}, {"jdbc-driver": "h2"}],
                "driver-name": "h2",
            })
        );
    }

    #[test]
    fn test_composite_to_model() {
        let step = Operation::new(names::ENABLE, Address::subsystem("datasources"));
        let op = Operation::composite(vec![step]);
        let model = op.to_model();

        assert_eq!(model["operation"], "composite");
        assert_eq!(model["address"], json!([]));
        assert_eq!(model["steps"][0]["operation"], "enable");
    }

    #[test]
    fn test_from_response_success() {
        let result = ModelNodeResult::from_response(json!({
            "outcome": "success",
            "result": ["DS1", "DS2"],
        }))
        .unwrap();

        assert!(result.is_success());
        assert_eq!(
            result.string_list_value(),
            Some(vec!["DS1".to_string(), "DS2".to_string()])
        );
    }

    #[test]
    fn test_from_response_failed() {
        let result = ModelNodeResult::from_response(json!({
            "outcome": "failed",
            "failure-description": "WFLYCTL0212: Duplicate resource",
            "rolled-back": true,
        }))
        .unwrap();

        assert!(result.is_failed());
        assert!(result.is_rolled_back());
        assert_eq!(result.failure_description(), Some("WFLYCTL0212: Duplicate resource"));
        assert!(result.assert_success().is_err());
    }

    #[test]
    fn test_from_response_structured_failure() {
        let result = ModelNodeResult::from_response(json!({
            "outcome": "failed",
            "failure-description": {"Composite operation failed": {"step-1": "boom"}},
        }))
        .unwrap();

        assert!(result.failure_description().unwrap().contains("boom"));
    }

    #[test]
    fn test_from_response_invalid() {
        assert!(ModelNodeResult::from_response(json!("nope")).is_err());
        assert!(ModelNodeResult::from_response(json!({"result": 1})).is_err());
        assert!(ModelNodeResult::from_response(json!({"outcome": "weird"})).is_err());
    }

    #[test]
    fn test_null_result_is_undefined() {
        let result = ModelNodeResult::success(Some(Value::Null));
        assert!(result.value().is_none());
        assert!(result.assert_success().is_ok());
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(ModelNodeResult::success(Some(json!(true))).bool_value(), Some(true));
        assert_eq!(ModelNodeResult::success(Some(json!("true"))).bool_value(), Some(true));
        assert_eq!(ModelNodeResult::success(Some(json!(4))).int_value(), Some(4));
        assert_eq!(
            ModelNodeResult::success(Some(json!(4))).string_value(),
            Some("4".to_string())
        );
    }
}
