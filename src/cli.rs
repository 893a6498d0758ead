use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use management::DatabaseVendor;

#[derive(Parser)]
#[command(name = "wildcfg")]
#[command(version)]
#[command(
    about = "Configure application servers live or offline with the same commands",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Show what would change without touching the target
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where to apply commands
#[derive(Args, Default)]
pub struct TargetArgs {
    /// Named target from config.toml
    #[arg(short, long, global = true, conflicts_with_all = ["url", "file"])]
    pub target: Option<String>,

    /// Base URL of a running server, e.g. http://localhost:9990
    #[arg(long, global = true, conflicts_with = "file")]
    pub url: Option<String>,

    /// Configuration file to edit offline, e.g. standalone.xml
    #[arg(long, global = true)]
    pub file: Option<String>,

    /// Management user (password from WILDCFG_PASSWORD or config)
    #[arg(long, global = true)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage data sources
    #[command(subcommand)]
    Datasource(DatasourceCommand),

    /// Manage JDBC drivers
    #[command(subcommand)]
    Driver(DriverCommand),

    /// Manage management security realms
    #[command(subcommand)]
    Realm(RealmCommand),

    /// Read one attribute of a resource on a running server
    ReadAttribute {
        /// Resource address, e.g. /subsystem=datasources/data-source=ExampleDS
        address: String,

        /// Attribute name
        name: String,
    },

    /// Show the management model version of the target
    Version,

    /// Reload a running server
    Reload {
        /// Only reload when the server reports reload-required
        #[arg(long)]
        if_required: bool,

        /// Seconds to wait for the server to come back
        #[arg(long, default_value_t = 60)]
        timeout: u64,
    },

    /// List configured targets
    Targets,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Data Sources
// ============================================================================

#[derive(Subcommand)]
pub enum DatasourceCommand {
    /// Add a data source
    Add(DatasourceAddArgs),

    /// Remove a data source
    Remove {
        /// Pool name
        name: String,
    },
}

#[derive(Args)]
pub struct DatasourceAddArgs {
    /// Pool name
    pub name: String,

    /// JNDI name, e.g. java:jboss/datasources/AppDS
    #[arg(long)]
    pub jndi_name: String,

    /// Registered JDBC driver name
    #[arg(long)]
    pub driver: String,

    /// JDBC connection URL
    #[arg(long)]
    pub connection_url: String,

    /// Database user
    #[arg(long, conflicts_with = "security_domain")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, conflicts_with = "security_domain")]
    pub db_password: Option<String>,

    /// Security domain providing credentials
    #[arg(long)]
    pub security_domain: Option<String>,

    /// Minimum pool size
    #[arg(long)]
    pub min_pool_size: Option<u32>,

    /// Maximum pool size
    #[arg(long)]
    pub max_pool_size: Option<u32>,

    /// Transaction isolation, e.g. TRANSACTION_READ_COMMITTED
    #[arg(long)]
    pub transaction_isolation: Option<String>,

    /// Bind in the java: namespace
    #[arg(long)]
    pub use_java_context: Option<bool>,

    /// Enlist in JTA transactions
    #[arg(long)]
    pub jta: Option<bool>,

    /// SQL used to check connections
    #[arg(long)]
    pub check_valid_connection_sql: Option<String>,

    /// Connection validation class
    #[arg(long)]
    pub valid_connection_checker: Option<String>,

    /// Stale connection detection class
    #[arg(long)]
    pub stale_connection_checker: Option<String>,

    /// Fatal exception detection class
    #[arg(long)]
    pub exception_sorter: Option<String>,

    /// Validate connections in the background
    #[arg(long)]
    pub background_validation: Option<bool>,

    /// Prepared statement cache size
    #[arg(long)]
    pub prepared_statements_cache_size: Option<u32>,

    /// Milliseconds to wait for a free connection
    #[arg(long)]
    pub blocking_timeout_wait_millis: Option<u32>,

    /// Minutes before an idle connection is closed
    #[arg(long)]
    pub idle_timeout_minutes: Option<u32>,

    /// Driver connection property (repeatable)
    #[arg(long = "property", value_name = "KEY=VALUE")]
    pub properties: Vec<String>,

    /// Database vendor whose validation defaults apply
    #[arg(long)]
    pub vendor: Option<DatabaseVendor>,

    /// Start the data source right away
    #[arg(long)]
    pub enable: bool,

    /// Replace an existing data source of the same name
    #[arg(long)]
    pub replace: bool,
}

// ============================================================================
// JDBC Drivers
// ============================================================================

#[derive(Subcommand)]
pub enum DriverCommand {
    /// Register a JDBC driver
    Add(DriverAddArgs),

    /// Unregister a JDBC driver
    Remove {
        /// Driver name
        name: String,
    },
}

#[derive(Args)]
pub struct DriverAddArgs {
    /// Driver name
    pub name: String,

    /// Module holding the driver jar
    #[arg(long)]
    pub module: String,

    /// Module slot
    #[arg(long)]
    pub slot: Option<String>,

    /// java.sql.Driver implementation
    #[arg(long)]
    pub driver_class: Option<String>,

    /// javax.sql.XADataSource implementation
    #[arg(long)]
    pub xa_datasource_class: Option<String>,

    /// javax.sql.DataSource implementation
    #[arg(long)]
    pub datasource_class: Option<String>,

    /// Replace an existing driver of the same name
    #[arg(long)]
    pub replace: bool,
}

// ============================================================================
// Security Realms
// ============================================================================

#[derive(Subcommand)]
pub enum RealmCommand {
    /// Create a security realm
    Add {
        /// Realm name
        name: String,

        /// Map groups to roles during authorization
        #[arg(long)]
        map_groups_to_roles: Option<bool>,

        /// Replace an existing realm of the same name
        #[arg(long)]
        replace: bool,
    },

    /// Remove a security realm
    Remove {
        /// Realm name
        name: String,
    },

    /// Authenticate against a properties file
    PropertiesAuth {
        #[command(flatten)]
        properties: PropertiesArgs,

        /// Passwords are stored in plain text
        #[arg(long)]
        plain_text: Option<bool>,
    },

    /// Load roles from a properties file
    PropertiesAuthz {
        #[command(flatten)]
        properties: PropertiesArgs,
    },

    /// Allow local clients without credentials
    LocalAuth {
        /// Realm name
        realm: String,

        /// User assumed for local clients
        #[arg(long)]
        default_user: Option<String>,

        /// Comma-separated users local clients may claim
        #[arg(long)]
        allowed_users: Option<String>,

        /// Skip loading groups for local users
        #[arg(long)]
        skip_group_loading: Option<bool>,

        /// Replace an existing local mechanism
        #[arg(long)]
        replace: bool,
    },
}

#[derive(Args)]
pub struct PropertiesArgs {
    /// Realm name
    pub realm: String,

    /// Properties file path
    #[arg(long)]
    pub path: String,

    /// Path the file is relative to, e.g. jboss.server.config.dir
    #[arg(long)]
    pub relative_to: Option<String>,

    /// Replace an existing mechanism
    #[arg(long)]
    pub replace: bool,
}

// ============================================================================
// Tests
// ============================================================================
