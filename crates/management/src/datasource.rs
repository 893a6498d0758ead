//! Data source commands.

use crate::command::{self, Command};
use crate::context::OnlineContext;
use crate::error::{self, Error, Result};
use crate::vendor::{DatabaseVendor, vendor_defaults};
use model::{Address, ManagementVersion, Values};
use offline::{Element, Params, Scope, Script, Subtree, Transform};
use online::Batch;
use online::operation::names;
use std::collections::BTreeMap;

/// JNDI namespaces a data source may be bound in.
const JNDI_PREFIXES: &[&str] = &["java:/", "java:jboss/"];

/// Accepted `transaction-isolation` values.
const TRANSACTION_ISOLATIONS: &[&str] = &[
    "TRANSACTION_READ_UNCOMMITTED",
    "TRANSACTION_READ_COMMITTED",
    "TRANSACTION_REPEATABLE_READ",
    "TRANSACTION_SERIALIZABLE",
    "TRANSACTION_NONE",
];

/// Subtree name used by the data source scripts.
const DATASOURCES: &str = "datasources";

fn address(name: &str) -> Address {
    Address::subsystem(DATASOURCES).and("data-source", name)
}

fn label(name: &str) -> String {
    format!("Data source '{name}'")
}

/// Settings of a new data source.
///
/// `None` leaves a setting to the server default (or to the vendor
/// default when a vendor is set).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSourceConfig {
    /// Pool name, also the resource name.
    pub name: String,
    /// JNDI name, `java:/...` or `java:jboss/...`.
    pub jndi_name: String,
    /// Name of a registered JDBC driver.
    pub driver_name: String,
    /// JDBC URL.
    pub connection_url: String,
    /// Database user.
    pub user_name: Option<String>,
    /// Database password.
    pub password: Option<String>,
    /// Security domain providing credentials; excludes user and password.
    pub security_domain: Option<String>,
    /// Minimum pool size.
    pub min_pool_size: Option<u32>,
    /// Maximum pool size.
    pub max_pool_size: Option<u32>,
    /// One of the `TRANSACTION_*` isolation levels.
    pub transaction_isolation: Option<String>,
    /// Bind in the `java:` namespace.
    pub use_java_context: Option<bool>,
    /// Enlist in JTA transactions.
    pub jta: Option<bool>,
    /// SQL used to validate connections.
    pub check_valid_connection_sql: Option<String>,
    /// Connection validation class.
    pub valid_connection_checker_class_name: Option<String>,
    /// Stale connection detection class.
    pub stale_connection_checker_class_name: Option<String>,
    /// Fatal exception detection class.
    pub exception_sorter_class_name: Option<String>,
    /// Validate connections in the background.
    pub background_validation: Option<bool>,
    /// Prepared statement cache size per connection.
    pub prepared_statements_cache_size: Option<u32>,
    /// How long to wait for a connection.
    pub blocking_timeout_wait_millis: Option<u32>,
    /// Idle time before a connection is closed.
    pub idle_timeout_minutes: Option<u32>,
    /// Extra driver connection properties.
    pub connection_properties: BTreeMap<String, String>,
    /// Vendor whose defaults fill unset validation settings.
    pub vendor: Option<DatabaseVendor>,
    /// Start the data source right away.
    pub enable_after_create: bool,
    /// Replace an existing data source of the same name.
    pub replace_existing: bool,
}

impl DataSourceConfig {
    /// Check arguments; runs before any backend is touched.
    pub fn validate(&self) -> Result<()> {
        error::require("data source name", &self.name)?;
        error::require("JNDI name", &self.jndi_name)?;
        error::require("driver name", &self.driver_name)?;
        error::require("connection URL", &self.connection_url)?;

        if !JNDI_PREFIXES
            .iter()
            .any(|prefix| self.jndi_name.starts_with(prefix))
        {
            return Err(Error::invalid(format!(
                "JNDI name '{}' must start with one of {}",
                self.jndi_name,
                JNDI_PREFIXES.join(", ")
            )));
        }
        if self.security_domain.is_some() && (self.user_name.is_some() || self.password.is_some()) {
            return Err(Error::invalid(
                "security domain and user name/password are mutually exclusive",
            ));
        }
        if self.password.is_some() && self.user_name.is_none() {
            return Err(Error::invalid("password requires a user name"));
        }
        error::require_if_present("security domain", self.security_domain.as_deref())?;
        if let (Some(min), Some(max)) = (self.min_pool_size, self.max_pool_size) {
            if min > max {
                return Err(Error::invalid(format!(
                    "min pool size ({min}) must not exceed max pool size ({max})"
                )));
            }
        }
        if let Some(isolation) = &self.transaction_isolation {
            if !TRANSACTION_ISOLATIONS.contains(&isolation.as_str()) {
                return Err(Error::invalid(format!(
                    "unknown transaction isolation '{isolation}'"
                )));
            }
        }
        if self.connection_properties.keys().any(|key| key.trim().is_empty()) {
            return Err(Error::invalid("connection property names must not be empty"));
        }
        Ok(())
    }

    /// The resource attributes shared by both backends.
    pub fn values(&self) -> Values {
        let caller = Values::empty()
            .and("jndi-name", &self.jndi_name)
            .and("driver-name", &self.driver_name)
            .and("connection-url", &self.connection_url)
            .and("enabled", self.enable_after_create)
            .and_optional("user-name", self.user_name.as_ref())
            .and_optional("password", self.password.as_ref())
            .and_optional("security-domain", self.security_domain.as_ref())
            .and_optional("min-pool-size", self.min_pool_size)
            .and_optional("max-pool-size", self.max_pool_size)
            .and_optional("transaction-isolation", self.transaction_isolation.as_ref())
            .and_optional("use-java-context", self.use_java_context)
            .and_optional("jta", self.jta)
            .and_optional("check-valid-connection-sql", self.check_valid_connection_sql.as_ref())
            .and_optional(
                "valid-connection-checker-class-name",
                self.valid_connection_checker_class_name.as_ref(),
            )
            .and_optional(
                "stale-connection-checker-class-name",
                self.stale_connection_checker_class_name.as_ref(),
            )
            .and_optional("exception-sorter-class-name", self.exception_sorter_class_name.as_ref())
            .and_optional("background-validation", self.background_validation)
            .and_optional(
                "prepared-statements-cache-size",
                self.prepared_statements_cache_size,
            )
            .and_optional("blocking-timeout-wait-millis", self.blocking_timeout_wait_millis)
            .and_optional("idle-timeout-minutes", self.idle_timeout_minutes);

        match self.vendor {
            Some(vendor) => vendor_defaults(vendor).merge(&caller),
            None => caller,
        }
    }
}

/// Create a data source.
///
/// Below management version 2.0.0 a data source created with
/// `enabled=true` must also be enabled explicitly; from 2.0.0 on, the
/// attribute alone starts it and an extra `enable` would fail.
#[derive(Debug, Clone)]
pub struct AddDataSource {
    config: DataSourceConfig,
}

impl AddDataSource {
    /// Validate and wrap a configuration.
    pub fn new(config: DataSourceConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration.
    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    fn address(&self) -> Address {
        address(&self.config.name)
    }
}

impl Command for AddDataSource {
    fn describe(&self) -> String {
        format!("add data source '{}'", self.config.name)
    }

    fn render_batch(&self, version: ManagementVersion) -> Batch {
        let address = self.address();
        let mut batch = Batch::new();
        batch.add(address.clone(), self.config.values());
        for (key, value) in &self.config.connection_properties {
            batch.add(
                address.and("connection-properties", key),
                Values::empty().and("value", value),
            );
        }
        if self.config.enable_after_create && version.less_than(ManagementVersion::VERSION_2_0_0) {
            batch.invoke(names::ENABLE, address);
        }
        batch
    }

    fn render_transform(&self, _version: ManagementVersion) -> Transform {
        let properties = Values::from_map(Some(&self.config.connection_properties));
        Transform::of(ADD_DATASOURCE)
            .subtree(DATASOURCES, Subtree::subsystem(DATASOURCES))
            .parameter("pool-name", &self.config.name)
            .parameters(&self.config.values())
            .parameter_optional("connection-properties", Some(properties).filter(|p| !p.is_empty()))
            .parameter("replace-existing", self.config.replace_existing)
            .build()
    }

    fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        if self.config.replace_existing {
            return Ok(());
        }
        command::ensure_absent(ctx, &self.address(), &label(&self.config.name))
    }

    fn mutate_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        if self.config.replace_existing {
            command::remove_for_replace(ctx, &self.address())?;
        }
        command::submit(ctx, &self.describe(), &self.render_batch(ctx.version()))
    }
}

/// Remove a data source.
#[derive(Debug, Clone)]
pub struct RemoveDataSource {
    name: String,
}

impl RemoveDataSource {
    /// Remove the data source with pool name `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        error::require("data source name", &name)?;
        Ok(Self { name })
    }
}

impl Command for RemoveDataSource {
    fn describe(&self) -> String {
        format!("remove data source '{}'", self.name)
    }

    fn render_batch(&self, _version: ManagementVersion) -> Batch {
        let mut batch = Batch::new();
        batch.remove(address(&self.name));
        batch
    }

    fn render_transform(&self, _version: ManagementVersion) -> Transform {
        Transform::of(REMOVE_DATASOURCE)
            .subtree(DATASOURCES, Subtree::subsystem(DATASOURCES))
            .parameter("pool-name", &self.name)
            .build()
    }

    fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        command::ensure_present(ctx, &address(&self.name), &label(&self.name))
    }
}

const ADD_DATASOURCE: Script = Script::new("add-datasource", add_datasource);
const REMOVE_DATASOURCE: Script = Script::new("remove-datasource", remove_datasource);

fn add_datasource(scope: &mut Scope<'_>) -> offline::Result<()> {
    let params = scope.params();
    let pool_name = params.required_string("pool-name")?;
    let replace = params.bool("replace-existing")?;
    let datasource = datasource_element(params, &pool_name)?;

    let subsystem = scope.subtree(DATASOURCES)?;
    let datasources = subsystem.child_or_insert("datasources", &[])?;
    let is_target = |element: &Element| {
        element.name == "datasource" && element.attribute("pool-name") == Some(pool_name.as_str())
    };

    if datasources.find_child(is_target).is_some() {
        if !replace {
            return Err(params.fail(error::already_exists(&label(&pool_name))));
        }
        datasources.replace_child(is_target, datasource);
    } else {
        datasources.insert_before(datasource, &["xa-datasource", "drivers"]);
    }
    Ok(())
}

fn remove_datasource(scope: &mut Scope<'_>) -> offline::Result<()> {
    let params = scope.params();
    let pool_name = params.required_string("pool-name")?;

    let subsystem = scope.subtree(DATASOURCES)?;
    let removed = subsystem.child_mut("datasources").map_or(0, |datasources| {
        datasources.remove_children_where(|element| {
            element.name == "datasource" && element.attribute("pool-name") == Some(pool_name.as_str())
        })
    });
    if removed == 0 {
        return Err(params.fail(error::does_not_exist(&label(&pool_name))));
    }
    Ok(())
}

/// `<datasource>` in schema order; absent parameters produce nothing.
fn datasource_element(params: Params<'_>, pool_name: &str) -> offline::Result<Element> {
    let mut datasource = Element::new("datasource")
        .with_attribute("jndi-name", params.required_string("jndi-name")?)
        .with_attribute("pool-name", pool_name);
    for attribute in ["enabled", "use-java-context", "jta"] {
        datasource.set_attribute_value(attribute, params.get(attribute));
    }

    datasource.push(
        Element::new("connection-url").with_text(params.required_string("connection-url")?),
    );
    if let Some(properties) = params.object("connection-properties") {
        for (key, value) in properties.iter() {
            datasource.push(
                Element::new("connection-property")
                    .with_attribute("name", key)
                    .with_text(value.to_string()),
            );
        }
    }
    datasource.push(Element::new("driver").with_text(params.required_string("driver-name")?));
    if let Some(isolation) = params.string("transaction-isolation") {
        datasource.push(Element::new("transaction-isolation").with_text(isolation));
    }

    let sections = [
        text_section(params, "pool", &[
            ("min-pool-size", "min-pool-size"),
            ("max-pool-size", "max-pool-size"),
        ]),
        text_section(params, "security", &[
            ("user-name", "user-name"),
            ("password", "password"),
            ("security-domain", "security-domain"),
        ]),
        validation_section(params),
        text_section(params, "timeout", &[
            ("blocking-timeout-millis", "blocking-timeout-wait-millis"),
            ("idle-timeout-minutes", "idle-timeout-minutes"),
        ]),
        text_section(params, "statement", &[(
            "prepared-statement-cache-size",
            "prepared-statements-cache-size",
        )]),
    ];
    for section in sections.into_iter().flatten() {
        datasource.push(section);
    }
    Ok(datasource)
}

/// A section of `(element, parameter)` text children; `None` when empty.
fn text_section(params: Params<'_>, name: &str, fields: &[(&str, &str)]) -> Option<Element> {
    let mut section = Element::new(name);
    for (element, param) in fields {
        if let Some(value) = params.string(param) {
            section.push(Element::new(*element).with_text(value));
        }
    }
    (!section.children.is_empty()).then_some(section)
}

fn validation_section(params: Params<'_>) -> Option<Element> {
    let mut validation = Element::new("validation");
    let class = |element: &str, param: &str| {
        params
            .string(param)
            .map(|class| Element::new(element).with_attribute("class-name", class))
    };

    let children = [
        class("valid-connection-checker", "valid-connection-checker-class-name"),
        params
            .string("check-valid-connection-sql")
            .map(|sql| Element::new("check-valid-connection-sql").with_text(sql)),
        params
            .string("background-validation")
            .map(|flag| Element::new("background-validation").with_text(flag)),
        class("stale-connection-checker", "stale-connection-checker-class-name"),
        class("exception-sorter", "exception-sorter-class-name"),
    ];
    for child in children.into_iter().flatten() {
        validation.push(child);
    }
    (!validation.children.is_empty()).then_some(validation)
}
