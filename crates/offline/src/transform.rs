//! Parameterized document mutations.
//!
//! A [`Script`] is a named function that edits a document through a
//! [`Scope`]. A [`Transform`] binds a script to the subtrees it may touch and
//! to a parameter bag, using the same absent/explicit rules as [`Values`]:
//! a parameter that was never set reads as `None` and must not produce an
//! attribute, while an explicit `false` or `0` is a real value.

use crate::error::{Error, Result};
use crate::subtree::Subtree;
use crate::xml::Element;
use model::{ModelValue, Values};
use std::fmt;

/// Body of a script.
pub type ScriptBody = fn(&mut Scope<'_>) -> Result<()>;

/// A named document mutation.
#[derive(Clone, Copy)]
pub struct Script {
    /// Name used in logs and errors.
    pub name: &'static str,
    /// The mutation.
    pub body: ScriptBody,
}

impl Script {
    /// Create a script.
    pub const fn new(name: &'static str, body: ScriptBody) -> Self {
        Self { name, body }
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Script").field("name", &self.name).finish()
    }
}

/// A script bound to its subtrees and parameters.
#[derive(Debug, Clone)]
pub struct Transform {
    script: Script,
    subtrees: Vec<(String, Subtree)>,
    parameters: Values,
}

impl Transform {
    /// Start building a transform for `script`.
    pub fn of(script: Script) -> TransformBuilder {
        TransformBuilder {
            transform: Self {
                script,
                subtrees: Vec::new(),
                parameters: Values::empty(),
            },
        }
    }

    /// Name of the bound script.
    pub fn script_name(&self) -> &'static str {
        self.script.name
    }

    /// The parameter bag.
    pub fn parameters(&self) -> &Values {
        &self.parameters
    }

    /// Declared subtrees by name.
    pub fn subtrees(&self) -> impl Iterator<Item = (&str, &Subtree)> {
        self.subtrees
            .iter()
            .map(|(name, subtree)| (name.as_str(), subtree))
    }

    /// Run the script against a document element, mutating it in place.
    ///
    /// Callers that need all-or-nothing behavior run this on a copy; see
    /// [`Document::apply`](crate::Document::apply).
    pub fn run(&self, root: &mut Element) -> Result<()> {
        log::debug!(
            "running script {} with {} parameter(s)",
            self.script.name,
            self.parameters.len()
        );
        let mut scope = Scope {
            transform: self,
            root,
        };
        (self.script.body)(&mut scope)
    }
}

/// Builder returned by [`Transform::of`].
#[derive(Debug, Clone)]
pub struct TransformBuilder {
    transform: Transform,
}

impl TransformBuilder {
    /// Declare a subtree the script may resolve by `name`.
    #[must_use]
    pub fn subtree(mut self, name: impl Into<String>, locator: Subtree) -> Self {
        self.transform.subtrees.push((name.into(), locator));
        self
    }

    /// Always set a parameter.
    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<ModelValue>) -> Self {
        self.transform.parameters = self.transform.parameters.and(name, value);
        self
    }

    /// Set a parameter unless `value` is `None`.
    #[must_use]
    pub fn parameter_optional<T: Into<ModelValue>>(
        mut self,
        name: impl Into<String>,
        value: Option<T>,
    ) -> Self {
        self.transform.parameters = self.transform.parameters.and_optional(name, value);
        self
    }

    /// Set every entry of `values` as a parameter.
    #[must_use]
    pub fn parameters(mut self, values: &Values) -> Self {
        self.transform.parameters = self.transform.parameters.merge(values);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> Transform {
        self.transform
    }
}

/// Read-only view of the parameters of a running script.
///
/// Detached from [`Scope`] so it stays usable while a subtree is borrowed.
#[derive(Debug, Clone, Copy)]
pub struct Params<'a> {
    script: &'static str,
    values: &'a Values,
}

impl<'a> Params<'a> {
    /// Raw parameter, `None` when absent.
    pub fn get(&self, name: &str) -> Option<&'a ModelValue> {
        self.values.get(name)
    }

    /// Whether the parameter was set.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains(name)
    }

    /// Parameter as text, `None` when absent.
    pub fn string(&self, name: &str) -> Option<String> {
        self.get(name).map(ToString::to_string)
    }

    /// Parameter as text; absence is an error.
    pub fn required_string(&self, name: &str) -> Result<String> {
        self.string(name).ok_or_else(|| Error::MissingParameter {
            script: self.script.to_string(),
            name: name.to_string(),
        })
    }

    /// Boolean parameter; absent reads as `false`.
    pub fn bool(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            None => Ok(false),
            Some(value) => value.as_bool().ok_or_else(|| Error::InvalidParameter {
                script: self.script.to_string(),
                name: name.to_string(),
                message: format!("expected a boolean, got '{value}'"),
            }),
        }
    }

    /// Nested parameter bag, `None` when absent.
    pub fn object(&self, name: &str) -> Option<&'a Values> {
        self.get(name).and_then(ModelValue::as_object)
    }

    /// A business-rule refusal raised by this script.
    pub fn fail(&self, message: impl Into<String>) -> Error {
        Error::Precondition {
            script: self.script.to_string(),
            message: message.into(),
        }
    }
}

/// What a running script sees: its subtrees and its parameters.
pub struct Scope<'a> {
    transform: &'a Transform,
    root: &'a mut Element,
}

impl<'a> Scope<'a> {
    /// Resolve a declared subtree, creating the section when absent.
    pub fn subtree(&mut self, name: &str) -> Result<&mut Element> {
        let locator = self
            .transform
            .subtrees
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, locator)| locator)
            .ok_or_else(|| Error::UnknownSubtree {
                script: self.transform.script.name.to_string(),
                name: name.to_string(),
            })?;
        locator.resolve(self.root)
    }

    /// The parameters, detached from this scope's borrow.
    pub fn params(&self) -> Params<'a> {
        Params {
            script: self.transform.script.name,
            values: &self.transform.parameters,
        }
    }

    /// Raw parameter, `None` when absent.
    pub fn param(&self, name: &str) -> Option<&'a ModelValue> {
        self.params().get(name)
    }

    /// Parameter as text, `None` when absent.
    pub fn string_param(&self, name: &str) -> Option<String> {
        self.params().string(name)
    }

    /// Parameter as text; absence is an error.
    pub fn required_string_param(&self, name: &str) -> Result<String> {
        self.params().required_string(name)
    }

    /// Boolean parameter; absent reads as `false`.
    pub fn bool_param(&self, name: &str) -> Result<bool> {
        self.params().bool(name)
    }

    /// A business-rule refusal raised by this script.
    pub fn fail(&self, message: impl Into<String>) -> Error {
        self.params().fail(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_property(scope: &mut Scope<'_>) -> Result<()> {
        let params = scope.params();
        let name = params.required_string("name")?;
        let properties = scope.subtree("properties")?;
        if properties.find_child(|e| e.attribute("name") == Some(name.as_str())).is_some() {
            return Err(params.fail(format!("property '{name}' already exists")));
        }
        let mut property = Element::new("property").with_attribute("name", name);
        property.set_attribute_value("value", params.get("value"));
        properties.push(property);
        Ok(())
    }

    const ADD_PROPERTY: Script = Script::new("add-property", add_property);

    fn transform(name: &str, value: Option<&str>) -> Transform {
        Transform::of(ADD_PROPERTY)
            .subtree("properties", Subtree::root())
            .parameter("name", name)
            .parameter_optional("value", value)
            .build()
    }

    #[test]
    fn test_run_applies_parameters() {
        let mut root = Element::new("properties");
        transform("a", Some("false")).run(&mut root).unwrap();

        let property = root.child("property").unwrap();
        assert_eq!(property.attribute("name"), Some("a"));
        assert_eq!(property.attribute("value"), Some("false"));
    }

    #[test]
    fn test_absent_parameter_writes_no_attribute() {
        let mut root = Element::new("properties");
        transform("a", None).run(&mut root).unwrap();
        assert_eq!(root.child("property").unwrap().attribute("value"), None);
    }

    #[test]
    fn test_precondition_failure() {
        let mut root = Element::new("properties");
        transform("a", None).run(&mut root).unwrap();
        let err = transform("a", None).run(&mut root).unwrap_err();

        assert!(err.is_precondition());
        assert_eq!(err.to_string(), "property 'a' already exists");
    }

    #[test]
    fn test_undeclared_subtree() {
        fn body(scope: &mut Scope<'_>) -> Result<()> {
            scope.subtree("nope").map(|_| ())
        }
        let transform = Transform::of(Script::new("undeclared", body)).build();
        let err = transform.run(&mut Element::new("server")).unwrap_err();
        assert!(matches!(err, Error::UnknownSubtree { .. }));
    }

    #[test]
    fn test_missing_and_invalid_parameters() {
        let transform = Transform::of(ADD_PROPERTY)
            .subtree("properties", Subtree::root())
            .parameter("flag", "maybe")
            .build();

        let err = transform.run(&mut Element::new("properties")).unwrap_err();
        assert!(matches!(err, Error::MissingParameter { .. }));

        let mut root = Element::new("x");
        let scope = Scope {
            transform: &transform,
            root: &mut root,
        };
        assert!(matches!(
            scope.bool_param("flag"),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(!scope.bool_param("absent").unwrap());
    }

    #[test]
    fn test_parameters_merge() {
        let values = Values::empty().and("jndi-name", "java:/DS").and("enabled", false);
        let transform = Transform::of(ADD_PROPERTY)
            .parameter("enabled", true)
            .parameters(&values)
            .build();

        assert_eq!(transform.parameters().get("enabled"), Some(&ModelValue::from(false)));
        assert_eq!(transform.parameters().len(), 2);
        assert_eq!(transform.script_name(), "add-property");
    }
}
