use super::confirm;
use crate::Context;
use crate::cli::DriverAddArgs;
use crate::ui;
use anyhow::Result;
use management::{AddJdbcDriver, JdbcDriverConfig, RemoveJdbcDriver};

pub fn add(ctx: &Context, args: DriverAddArgs) -> Result<()> {
    let command = AddJdbcDriver::new(JdbcDriverConfig {
        name: args.name,
        module: args.module,
        module_slot: args.slot,
        driver_class: args.driver_class,
        xa_datasource_class: args.xa_datasource_class,
        datasource_class: args.datasource_class,
        replace_existing: args.replace,
    })?;
    super::run(ctx, &command)
}

pub fn remove(ctx: &Context, name: &str) -> Result<()> {
    let command = RemoveJdbcDriver::new(name)?;
    if !confirm(ctx, &format!("Remove JDBC driver '{name}'?"))? {
        ui::warn("Cancelled");
        return Ok(());
    }
    super::run(ctx, &command)
}
