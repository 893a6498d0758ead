use super::confirm;
use crate::Context;
use crate::cli::{PropertiesArgs, RealmCommand};
use crate::ui;
use anyhow::Result;
use management::{
    AddLocalAuthentication, AddPropertiesAuthentication, AddPropertiesAuthorization,
    AddSecurityRealm, LocalAuthenticationConfig, PropertiesConfig, RemoveSecurityRealm,
};

fn properties_config(args: PropertiesArgs) -> PropertiesConfig {
    PropertiesConfig {
        realm: args.realm,
        path: args.path,
        relative_to: args.relative_to,
        replace_existing: args.replace,
    }
}

pub fn run(ctx: &Context, cmd: RealmCommand) -> Result<()> {
    match cmd {
        RealmCommand::Add {
            name,
            map_groups_to_roles,
            replace,
        } => {
            let command = AddSecurityRealm::new(name)?
                .map_groups_to_roles(map_groups_to_roles)
                .replace_existing(replace);
            super::run(ctx, &command)
        }
        RealmCommand::Remove { name } => {
            let command = RemoveSecurityRealm::new(&name)?;
            if !confirm(ctx, &format!("Remove security realm '{name}'?"))? {
                ui::warn("Cancelled");
                return Ok(());
            }
            super::run(ctx, &command)
        }
        RealmCommand::PropertiesAuth {
            properties,
            plain_text,
        } => {
            let command =
                AddPropertiesAuthentication::new(properties_config(properties), plain_text)?;
            super::run(ctx, &command)
        }
        RealmCommand::PropertiesAuthz { properties } => {
            let command = AddPropertiesAuthorization::new(properties_config(properties))?;
            super::run(ctx, &command)
        }
        RealmCommand::LocalAuth {
            realm,
            default_user,
            allowed_users,
            skip_group_loading,
            replace,
        } => {
            let command = AddLocalAuthentication::new(LocalAuthenticationConfig {
                realm,
                default_user,
                allowed_users,
                skip_group_loading,
                replace_existing: replace,
            })?;
            super::run(ctx, &command)
        }
    }
}
