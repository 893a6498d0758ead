//! Management security realm commands.
//!
//! Realms live under `/core-service=management/security-realm=NAME`
//! online and under `<management><security-realms>` offline. Mechanisms
//! (`authentication=properties`, `authorization=properties`,
//! `authentication=local`) are child resources of a realm; adding one to a
//! realm that does not exist is a precondition failure on both backends.

use crate::command::{self, Command};
use crate::context::OnlineContext;
use crate::error::{self, Result};
use model::{Address, ManagementVersion, Values};
use offline::{Element, Scope, Script, Subtree, Transform};
use online::Batch;

const MANAGEMENT: &str = "management";

/// Children of `<management>` that follow `<security-realms>`.
const AFTER_SECURITY_REALMS: &[&str] = &[
    "outbound-connections",
    "audit-log",
    "management-interfaces",
    "access-control",
];
/// Children of `<security-realm>` that follow `<authentication>`.
const AFTER_AUTHENTICATION: &[&str] = &["authorization"];
/// Children of `<authentication>` that follow `<local>`.
const AFTER_LOCAL: &[&str] = &["jaas", "ldap", "properties", "users", "plug-in"];

fn realm_address(realm: &str) -> Address {
    Address::core_service(MANAGEMENT).and("security-realm", realm)
}

fn realm_label(realm: &str) -> String {
    format!("Security realm '{realm}'")
}

fn management_transform(script: Script) -> offline::TransformBuilder {
    Transform::of(script).subtree(MANAGEMENT, Subtree::management())
}

fn is_realm(name: &str) -> impl Fn(&Element) -> bool + Copy + '_ {
    move |element: &Element| element.name == "security-realm" && element.attribute("name") == Some(name)
}

/// Create a security realm.
#[derive(Debug, Clone)]
pub struct AddSecurityRealm {
    name: String,
    map_groups_to_roles: Option<bool>,
    replace_existing: bool,
}

impl AddSecurityRealm {
    /// A realm named `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        error::require("realm name", &name)?;
        Ok(Self {
            name,
            map_groups_to_roles: None,
            replace_existing: false,
        })
    }

    /// Whether groups map to roles during authorization.
    #[must_use]
    pub fn map_groups_to_roles(mut self, value: Option<bool>) -> Self {
        self.map_groups_to_roles = value;
        self
    }

    /// Replace an existing realm of the same name.
    #[must_use]
    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }

    fn values(&self) -> Values {
        Values::empty().and_optional("map-groups-to-roles", self.map_groups_to_roles)
    }
}

impl Command for AddSecurityRealm {
    fn describe(&self) -> String {
        format!("add security realm '{}'", self.name)
    }

    fn render_batch(&self, _version: ManagementVersion) -> Batch {
        let mut batch = Batch::new();
        batch.add(realm_address(&self.name), self.values());
        batch
    }

    fn render_transform(&self, _version: ManagementVersion) -> Transform {
        management_transform(ADD_REALM)
            .parameter("realm", &self.name)
            .parameters(&self.values())
            .parameter("replace-existing", self.replace_existing)
            .build()
    }

    fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        if self.replace_existing {
            return Ok(());
        }
        command::ensure_absent(ctx, &realm_address(&self.name), &realm_label(&self.name))
    }

    fn mutate_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        if self.replace_existing {
            command::remove_for_replace(ctx, &realm_address(&self.name))?;
        }
        command::submit(ctx, &self.describe(), &self.render_batch(ctx.version()))
    }
}

/// Remove a security realm with all its mechanisms.
#[derive(Debug, Clone)]
pub struct RemoveSecurityRealm {
    name: String,
}

impl RemoveSecurityRealm {
    /// Remove the realm named `name`.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        error::require("realm name", &name)?;
        Ok(Self { name })
    }
}

impl Command for RemoveSecurityRealm {
    fn describe(&self) -> String {
        format!("remove security realm '{}'", self.name)
    }

    fn render_batch(&self, _version: ManagementVersion) -> Batch {
        let mut batch = Batch::new();
        batch.remove(realm_address(&self.name));
        batch
    }

    fn render_transform(&self, _version: ManagementVersion) -> Transform {
        management_transform(REMOVE_REALM)
            .parameter("realm", &self.name)
            .build()
    }

    fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        command::ensure_present(ctx, &realm_address(&self.name), &realm_label(&self.name))
    }
}

/// A mechanism child of a realm, shared by the mechanism commands.
#[derive(Debug, Clone)]
struct Mechanism {
    realm: String,
    /// `authentication` or `authorization`.
    section: &'static str,
    /// `properties` or `local`.
    kind: &'static str,
    /// For messages, e.g. `Properties authentication`.
    title: &'static str,
    values: Values,
    replace_existing: bool,
}

impl Mechanism {
    fn address(&self) -> Address {
        realm_address(&self.realm).and(self.section, self.kind)
    }

    fn describe(&self) -> String {
        format!(
            "add {} to security realm '{}'",
            self.title.to_lowercase(),
            self.realm
        )
    }

    fn render_batch(&self) -> Batch {
        let mut batch = Batch::new();
        batch.add(self.address(), self.values.clone());
        batch
    }

    fn render_transform(&self) -> Transform {
        management_transform(ADD_MECHANISM)
            .parameter("realm", &self.realm)
            .parameter("section", self.section)
            .parameter("mechanism", self.kind)
            .parameter("title", self.title)
            .parameter("attributes", self.values.clone())
            .parameter("replace-existing", self.replace_existing)
            .build()
    }

    fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        command::ensure_present(ctx, &realm_address(&self.realm), &realm_label(&self.realm))?;
        if self.replace_existing {
            return Ok(());
        }
        if ctx.operations().exists(&self.address())? {
            return Err(error::Error::failed(already_configured(self.title, &self.realm)));
        }
        Ok(())
    }

    fn mutate_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
        if self.replace_existing {
            command::remove_for_replace(ctx, &self.address())?;
        }
        command::submit(ctx, &self.describe(), &self.render_batch())
    }
}

fn already_configured(title: &str, realm: &str) -> String {
    format!("{title} is already configured for security realm '{realm}'")
}

macro_rules! mechanism_command {
    ($ty:ident) => {
        impl Command for $ty {
            fn describe(&self) -> String {
                self.mechanism.describe()
            }

            fn render_batch(&self, _version: ManagementVersion) -> Batch {
                self.mechanism.render_batch()
            }

            fn render_transform(&self, _version: ManagementVersion) -> Transform {
                self.mechanism.render_transform()
            }

            fn check_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
                self.mechanism.check_online(ctx)
            }

            fn mutate_online(&self, ctx: &OnlineContext<'_>) -> Result<()> {
                self.mechanism.mutate_online(ctx)
            }
        }
    };
}

/// Settings of a properties-file mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertiesConfig {
    /// Realm to extend.
    pub realm: String,
    /// Properties file path.
    pub path: String,
    /// Path the file is relative to, e.g. `jboss.server.config.dir`.
    pub relative_to: Option<String>,
    /// Replace an already configured mechanism.
    pub replace_existing: bool,
}

impl PropertiesConfig {
    fn validate(&self) -> Result<()> {
        error::require("realm name", &self.realm)?;
        error::require("path", &self.path)?;
        error::require_if_present("relative-to", self.relative_to.as_deref())
    }

    fn values(&self) -> Values {
        Values::empty()
            .and("path", &self.path)
            .and_optional("relative-to", self.relative_to.as_ref())
    }
}

/// Authenticate realm users against a properties file.
#[derive(Debug, Clone)]
pub struct AddPropertiesAuthentication {
    mechanism: Mechanism,
}

impl AddPropertiesAuthentication {
    /// Validate and wrap a configuration. `plain_text` says whether
    /// passwords in the file are stored unhashed.
    pub fn new(config: PropertiesConfig, plain_text: Option<bool>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mechanism: Mechanism {
                realm: config.realm.clone(),
                section: "authentication",
                kind: "properties",
                title: "Properties authentication",
                values: config.values().and_optional("plain-text", plain_text),
                replace_existing: config.replace_existing,
            },
        })
    }
}

mechanism_command!(AddPropertiesAuthentication);

/// Load realm user groups from a properties file.
#[derive(Debug, Clone)]
pub struct AddPropertiesAuthorization {
    mechanism: Mechanism,
}

impl AddPropertiesAuthorization {
    /// Validate and wrap a configuration.
    pub fn new(config: PropertiesConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            mechanism: Mechanism {
                realm: config.realm.clone(),
                section: "authorization",
                kind: "properties",
                title: "Properties authorization",
                values: config.values(),
                replace_existing: config.replace_existing,
            },
        })
    }
}

mechanism_command!(AddPropertiesAuthorization);

/// Settings of local (same-machine) authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalAuthenticationConfig {
    /// Realm to extend.
    pub realm: String,
    /// User local clients are authenticated as, e.g. `$local`.
    pub default_user: Option<String>,
    /// Comma separated users local clients may claim, or `*`.
    pub allowed_users: Option<String>,
    /// Skip loading groups for the local user.
    pub skip_group_loading: Option<bool>,
    /// Replace an already configured mechanism.
    pub replace_existing: bool,
}

/// Let local clients authenticate without credentials.
#[derive(Debug, Clone)]
pub struct AddLocalAuthentication {
    mechanism: Mechanism,
}

impl AddLocalAuthentication {
    /// Validate and wrap a configuration.
    pub fn new(config: LocalAuthenticationConfig) -> Result<Self> {
        error::require("realm name", &config.realm)?;
        error::require_if_present("default user", config.default_user.as_deref())?;
        error::require_if_present("allowed users", config.allowed_users.as_deref())?;

        let values = Values::empty()
            .and_optional("default-user", config.default_user)
            .and_optional("allowed-users", config.allowed_users)
            .and_optional("skip-group-loading", config.skip_group_loading);
        Ok(Self {
            mechanism: Mechanism {
                realm: config.realm,
                section: "authentication",
                kind: "local",
                title: "Local authentication",
                values,
                replace_existing: config.replace_existing,
            },
        })
    }
}

mechanism_command!(AddLocalAuthentication);

const ADD_REALM: Script = Script::new("add-security-realm", add_realm);
const REMOVE_REALM: Script = Script::new("remove-security-realm", remove_realm);
const ADD_MECHANISM: Script = Script::new("add-security-realm-mechanism", add_mechanism);

fn add_realm(scope: &mut Scope<'_>) -> offline::Result<()> {
    let params = scope.params();
    let name = params.required_string("realm")?;
    let replace = params.bool("replace-existing")?;

    let mut realm = Element::new("security-realm").with_attribute("name", &name);
    if let Some(map) = params.get("map-groups-to-roles") {
        let mut authorization = Element::new("authorization");
        authorization.set_attribute_value("map-groups-to-roles", Some(map));
        realm.push(authorization);
    }

    let realms = scope
        .subtree(MANAGEMENT)?
        .child_or_insert("security-realms", AFTER_SECURITY_REALMS)?;
    if realms.find_child(is_realm(&name)).is_some() {
        if !replace {
            return Err(params.fail(error::already_exists(&realm_label(&name))));
        }
        realms.replace_child(is_realm(&name), realm);
    } else {
        realms.push(realm);
    }
    Ok(())
}

fn remove_realm(scope: &mut Scope<'_>) -> offline::Result<()> {
    let params = scope.params();
    let name = params.required_string("realm")?;

    let removed = scope
        .subtree(MANAGEMENT)?
        .child_mut("security-realms")
        .map_or(0, |realms| realms.remove_children_where(is_realm(&name)));
    if removed == 0 {
        return Err(params.fail(error::does_not_exist(&realm_label(&name))));
    }
    Ok(())
}

fn add_mechanism(scope: &mut Scope<'_>) -> offline::Result<()> {
    let params = scope.params();
    let realm_name = params.required_string("realm")?;
    let section_name = params.required_string("section")?;
    let kind = params.required_string("mechanism")?;
    let title = params.required_string("title")?;
    let replace = params.bool("replace-existing")?;

    let mut mechanism = Element::new(kind.as_str());
    if let Some(attributes) = params.object("attributes") {
        for (name, value) in attributes.iter() {
            mechanism.set_attribute_value(name, Some(value));
        }
    }

    let realm = scope
        .subtree(MANAGEMENT)?
        .child_mut("security-realms")
        .and_then(|realms| realms.find_child_mut(is_realm(&realm_name)))
        .ok_or_else(|| params.fail(error::does_not_exist(&realm_label(&realm_name))))?;
    let before = if section_name == "authentication" {
        AFTER_AUTHENTICATION
    } else {
        &[]
    };
    let section = realm.child_or_insert(&section_name, before)?;

    if section.child(&kind).is_some() {
        if !replace {
            return Err(params.fail(already_configured(&title, &realm_name)));
        }
        section.replace_child(|element| element.name == kind, mechanism);
    } else if kind == "local" {
        section.insert_before(mechanism, AFTER_LOCAL);
    } else {
        section.push(mechanism);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn realm_with_management() -> Element {
        offline::Document::parse(
            r#"<server xmlns="urn:jboss:domain:1.7">
                <management>
                    <security-realms>
                        <security-realm name="ManagementRealm">
                            <authentication>
                                <properties path="mgmt-users.properties" relative-to="jboss.server.config.dir"/>
                            </authentication>
                        </security-realm>
                    </security-realms>
                    <management-interfaces/>
                </management>
            </server>"#,
        )
        .unwrap()
        .root
    }

    fn realm(root: &Element, name: &str) -> Element {
        root.child("management")
            .and_then(|m| m.child("security-realms"))
            .and_then(|r| r.find_child(is_realm(name)))
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_local_authentication_goes_first() {
        let command = AddLocalAuthentication::new(LocalAuthenticationConfig {
            realm: "ManagementRealm".into(),
            default_user: Some("$local".into()),
            skip_group_loading: Some(true),
            ..LocalAuthenticationConfig::default()
        })
        .unwrap();

        let mut root = realm_with_management();
        command
            .render_transform(ManagementVersion::VERSION_1_7_0)
            .run(&mut root)
            .unwrap();

        let authentication = realm(&root, "ManagementRealm").child("authentication").cloned().unwrap();
        let names: Vec<&str> = authentication.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["local", "properties"]);
        let local = authentication.child("local").unwrap();
        assert_eq!(local.attribute("default-user"), Some("$local"));
        assert_eq!(local.attribute("skip-group-loading"), Some("true"));
        assert_eq!(local.attribute("allowed-users"), None);
    }

    #[test]
    fn test_properties_authentication_already_configured() {
        let command = AddPropertiesAuthentication::new(
            PropertiesConfig {
                realm: "ManagementRealm".into(),
                path: "other.properties".into(),
                ..PropertiesConfig::default()
            },
            None,
        )
        .unwrap();

        let mut root = realm_with_management();
        let err = command
            .render_transform(ManagementVersion::VERSION_1_7_0)
            .run(&mut root)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Properties authentication is already configured for security realm 'ManagementRealm'"
        );
    }

    #[test]
    fn test_mechanism_on_missing_realm() {
        let command = AddPropertiesAuthorization::new(PropertiesConfig {
            realm: "Nope".into(),
            path: "groups.properties".into(),
            ..PropertiesConfig::default()
        })
        .unwrap();

        let mut root = realm_with_management();
        let err = command
            .render_transform(ManagementVersion::VERSION_1_7_0)
            .run(&mut root)
            .unwrap_err();
        assert_eq!(err.to_string(), "Security realm 'Nope' does not exist");
    }

    #[test]
    fn test_add_realm_with_map_groups() {
        let command = AddSecurityRealm::new("AppRealm")
            .unwrap()
            .map_groups_to_roles(Some(false));

        let mut root = realm_with_management();
        command
            .render_transform(ManagementVersion::VERSION_1_7_0)
            .run(&mut root)
            .unwrap();

        let added = realm(&root, "AppRealm");
        assert_eq!(
            added.child("authorization").unwrap().attribute("map-groups-to-roles"),
            Some("false")
        );
        assert_eq!(
            command.render_batch(ManagementVersion::VERSION_1_7_0).steps()[0].address(),
            &realm_address("AppRealm")
        );
    }

    #[test]
    fn test_authentication_precedes_existing_authorization() {
        let mut root = realm_with_management();
        AddSecurityRealm::new("AppRealm")
            .unwrap()
            .map_groups_to_roles(Some(true))
            .render_transform(ManagementVersion::VERSION_1_7_0)
            .run(&mut root)
            .unwrap();
        AddPropertiesAuthentication::new(
            PropertiesConfig {
                realm: "AppRealm".into(),
                path: "app-users.properties".into(),
                ..PropertiesConfig::default()
            },
            None,
        )
        .unwrap()
        .render_transform(ManagementVersion::VERSION_1_7_0)
        .run(&mut root)
        .unwrap();

        let added = realm(&root, "AppRealm");
        let names: Vec<&str> = added.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["authentication", "authorization"]);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(AddSecurityRealm::new(""), Err(Error::InvalidArgument(_))));
        assert!(
            AddPropertiesAuthentication::new(
                PropertiesConfig {
                    realm: "R".into(),
                    ..PropertiesConfig::default()
                },
                None
            )
            .is_err()
        );
        assert!(
            AddLocalAuthentication::new(LocalAuthenticationConfig {
                realm: "R".into(),
                default_user: Some(String::new()),
                ..LocalAuthenticationConfig::default()
            })
            .is_err()
        );
    }
}
