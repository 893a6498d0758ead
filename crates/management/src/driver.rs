//! JDBC driver registration commands.

use crate::command::{self, Command};
use crate::context::OnlineContext;
use crate::error::{self, Result};
use model::{Address, ManagementVersion, Values};
use offline::{Element, Scope, Script, Subtree, Transform};
use online::Batch;

const DATASOURCES: &str = "datasources";

fn address(name: &str) -> Address {
    Address::subsystem(DATASOURCES).and("jdbc-driver", name)
}

fn label(name: &str) -> String {
    format!("JDBC driver '{name}'")
}

/// Settings of a JDBC driver registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JdbcDriverConfig {
    /// Driver name referenced by data sources.
    pub name: String,
    /// Module providing the driver jar.
    pub module: String,
    /// Module slot.
    pub module_slot: Option<String>,
    /// `java.sql.Driver` implementation.
    pub driver_class: Option<String>,
    /// `javax.sql.XADataSource` implementation.
    pub xa_datasource_class: Option<String>,
    /// `javax.sql.DataSource` implementation.
    pub datasource_class: Option<String>,
    /// Replace an existing driver of the same name.
    pub replace_existing: bool,
}

impl JdbcDriverConfig {
    /// Check arguments; runs before any backend is touched.
    pub fn validate(&self) -> Result<()> {
        error::require("driver name", &self.name)?;
        error::require("module", &self.module)?;
        error::require_if_present("module slot", self.module_slot.as_deref())?;
        error::require_if_present("driver class", self.driver_class.as_deref())?;
        error::require_if_present("XA data source class", self.xa_datasource_class.as_deref())?;
        error::require_if_present("data source class", self.datasource_class.as_deref())?;
        Ok(())
    }

    /// The resource attributes shared by both backends.
    pub fn values(&self) -> Values {
        Values::empty()
            .and("driver-name", &self.name)
            .and("driver-module-name", &self.module)
            .and_optional("module-slot", self.module_slot.as_ref())
            .and_optional("driver-class-name", self.driver_class.as_ref())
            .and_optional("driver-xa-datasource-class-name", self.xa_datasource_class.as_ref())
            .and_optional("driver-datasource-class-name", self.datasource_class.as_ref())
    }
}

/// Register a JDBC driver. Offline, the `<drivers>` registry is created when
/// the document has none.
#[derive(Debug, Clone)]
pub struct AddJdbcDriver {
    config: JdbcDriverConfig,
}

impl AddJdbcDriver {
    /// Validate and wrap a configuration.
    pub fn new(config: JdbcDriverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Command for AddJdbcDriver {
    fn describe(&self) -> String {
        format!("add JDBC driver '{}'", self.config.name)
    }

    fn render_batch(&self, _version: ManagementVersion) -> Batch {
        let mut batch = Batch::new();
        batch.add(address(&self.config.name), self.config.values());
        batch
    }

    fn render_transform(&self, _version: ManagementVersion) -> Transform {
        Transform::of(ADD_DRIVER)
            .subtree(DATASOURCES, Subtree::subsystem(DATASOURCES))
            .parameters(&self.config.values())
            .parameter("replace-existing", self.config.replace_existing)
            .build()
    }

    fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        if self.config.replace_existing {
            return Ok(());
        }
        command::ensure_absent(ctx, &address(&self.config.name), &label(&self.config.name))
    }

    fn mutate_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        if self.config.replace_existing {
            command::remove_for_replace(ctx, &address(&self.config.name))?;
        }
        command::submit(ctx, &self.describe(), &self.render_batch(ctx.version()))
    }
}

/// Unregister a JDBC driver.
#[derive(Debug, Clone)]
pub struct RemoveJdbcDriver {
    name: String,
}

impl RemoveJdbcDriver {
    /// Remove the driver registered as `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        error::require("driver name", &name)?;
        Ok(Self { name })
    }
}

impl Command for RemoveJdbcDriver {
    fn describe(&self) -> String {
        format!("remove JDBC driver '{}'", self.name)
    }

    fn render_batch(&self, _version: ManagementVersion) -> Batch {
        let mut batch = Batch::new();
        batch.remove(address(&self.name));
        batch
    }

    fn render_transform(&self, _version: ManagementVersion) -> Transform {
        Transform::of(REMOVE_DRIVER)
            .subtree(DATASOURCES, Subtree::subsystem(DATASOURCES))
            .parameter("driver-name", &self.name)
            .build()
    }

    fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        command::ensure_present(ctx, &address(&self.name), &label(&self.name))
    }
}

const ADD_DRIVER: Script = Script::new("add-jdbc-driver", add_driver);
const REMOVE_DRIVER: Script = Script::new("remove-jdbc-driver", remove_driver);

fn add_driver(scope: &mut Scope<'_>) -> offline::Result<()> {
    let params = scope.params();
    let name = params.required_string("driver-name")?;
    let replace = params.bool("replace-existing")?;

    let mut driver = Element::new("driver")
        .with_attribute("name", &name)
        .with_attribute("module", params.required_string("driver-module-name")?);
    driver.set_attribute_value("slot", params.get("module-slot"));
    for (element, param) in [
        ("driver-class", "driver-class-name"),
        ("datasource-class", "driver-datasource-class-name"),
        ("xa-datasource-class", "driver-xa-datasource-class-name"),
    ] {
        if let Some(class) = params.string(param) {
            driver.push(Element::new(element).with_text(class));
        }
    }

    let subsystem = scope.subtree(DATASOURCES)?;
    let drivers = subsystem
        .child_or_insert("datasources", &[])?
        .child_or_insert("drivers", &[])?;
    let is_target = |element: &Element| {
        element.name == "driver" && element.attribute("name") == Some(name.as_str())
    };

    if drivers.find_child(is_target).is_some() {
        if !replace {
            return Err(params.fail(error::already_exists(&label(&name))));
        }
        drivers.replace_child(is_target, driver);
    } else {
        drivers.push(driver);
    }
    Ok(())
}

fn remove_driver(scope: &mut Scope<'_>) -> offline::Result<()> {
    let params = scope.params();
    let name = params.required_string("driver-name")?;

    let subsystem = scope.subtree(DATASOURCES)?;
    let removed = subsystem
        .child_mut("datasources")
        .and_then(|datasources| datasources.child_mut("drivers"))
        .map_or(0, |drivers| {
            drivers.remove_children_where(|element| {
                element.name == "driver" && element.attribute("name") == Some(name.as_str())
            })
        });
    if removed == 0 {
        return Err(params.fail(error::does_not_exist(&label(&name))));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use model::ModelValue;

    fn h2() -> JdbcDriverConfig {
        JdbcDriverConfig {
            name: "h2".into(),
            module: "com.h2database.h2".into(),
            xa_datasource_class: Some("org.h2.jdbcx.JdbcDataSource".into()),
            ..JdbcDriverConfig::default()
        }
    }

    #[test]
    fn test_validate() {
        assert!(h2().validate().is_ok());
        let no_module = JdbcDriverConfig {
            module: " ".into(),
            ..h2()
        };
        assert!(matches!(no_module.validate(), Err(Error::InvalidArgument(_))));
        let empty_slot = JdbcDriverConfig {
            module_slot: Some(String::new()),
            ..h2()
        };
        assert!(empty_slot.validate().is_err());
    }

    #[test]
    fn test_values() {
        let values = h2().values();
        assert_eq!(values.get("driver-module-name"), Some(&ModelValue::from("com.h2database.h2")));
        assert!(!values.contains("module-slot"));
        assert!(values.contains("driver-xa-datasource-class-name"));
    }

    #[test]
    fn test_offline_element() {
        let command = AddJdbcDriver::new(h2()).unwrap();
        let mut root = Element::new("server");
        command
            .render_transform(ManagementVersion::VERSION_4_0_0)
            .run(&mut root)
            .unwrap();

        let driver = root
            .child("profile")
            .and_then(|p| p.child("subsystem"))
            .and_then(|s| s.child("datasources"))
            .and_then(|d| d.child("drivers"))
            .and_then(|d| d.child("driver"))
            .unwrap();
        assert_eq!(driver.attribute("module"), Some("com.h2database.h2"));
        assert_eq!(driver.attribute("slot"), None);
        assert_eq!(
            driver.child("xa-datasource-class").unwrap().text(),
            "org.h2.jdbcx.JdbcDataSource"
        );
        assert!(driver.child("driver-class").is_none());
    }

    #[test]
    fn test_render_batch_single_add() {
        let batch = AddJdbcDriver::new(h2())
            .unwrap()
            .render_batch(ManagementVersion::VERSION_1_7_0);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.steps()[0].address(), &address("h2"));
    }
}
