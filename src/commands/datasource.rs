use super::{confirm, parse_key_value};
use crate::Context;
use crate::cli::DatasourceAddArgs;
use crate::ui;
use anyhow::Result;
use management::{AddDataSource, DataSourceConfig, RemoveDataSource};
use std::collections::BTreeMap;

/// Build the data source settings from command line arguments
fn config_from_args(args: DatasourceAddArgs) -> Result<DataSourceConfig> {
    let connection_properties = args
        .properties
        .iter()
        .map(String::as_str)
        .map(parse_key_value)
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(DataSourceConfig {
        name: args.name,
        jndi_name: args.jndi_name,
        driver_name: args.driver,
        connection_url: args.connection_url,
        user_name: args.db_user,
        password: args.db_password,
        security_domain: args.security_domain,
        min_pool_size: args.min_pool_size,
        max_pool_size: args.max_pool_size,
        transaction_isolation: args.transaction_isolation,
        use_java_context: args.use_java_context,
        jta: args.jta,
        check_valid_connection_sql: args.check_valid_connection_sql,
        valid_connection_checker_class_name: args.valid_connection_checker,
        stale_connection_checker_class_name: args.stale_connection_checker,
        exception_sorter_class_name: args.exception_sorter,
        background_validation: args.background_validation,
        prepared_statements_cache_size: args.prepared_statements_cache_size,
        blocking_timeout_wait_millis: args.blocking_timeout_wait_millis,
        idle_timeout_minutes: args.idle_timeout_minutes,
        connection_properties,
        vendor: args.vendor,
        enable_after_create: args.enable,
        replace_existing: args.replace,
    })
}

pub fn add(ctx: &Context, args: DatasourceAddArgs) -> Result<()> {
    let command = AddDataSource::new(config_from_args(args)?)?;
    super::run(ctx, &command)
}

pub fn remove(ctx: &Context, name: &str) -> Result<()> {
    let command = RemoveDataSource::new(name)?;
    if !confirm(ctx, &format!("Remove data source '{name}'?"))? {
        ui::warn("Cancelled");
        return Ok(());
    }
    super::run(ctx, &command)
}
