//! Commands that talk to the server directly rather than applying a change

use super::{confirm, http_client, open_file};
use crate::Context;
use crate::config::{Endpoint, ServerEndpoint};
use crate::ui;
use anyhow::{Context as _, Result, bail};
use model::Address;
use online::{Administration, HttpClient};
use serde_json::Value;
use std::time::Duration;

fn require_server(ctx: &Context, action: &str) -> Result<ServerEndpoint> {
    match ctx.endpoint()? {
        Endpoint::Server(server) => Ok(server),
        Endpoint::File(file) => bail!(
            "{action} needs a running server, but target '{}' is the file {}",
            file.name,
            file.path.display()
        ),
    }
}

/// Render an attribute value for the terminal
fn format_value(value: Option<&Value>) -> Result<String> {
    Ok(match value {
        None | Some(Value::Null) => "undefined".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => serde_json::to_string_pretty(other)?,
    })
}

pub fn read_attribute(ctx: &Context, address: &str, name: &str) -> Result<()> {
    let address: Address = address.parse()?;
    let server = require_server(ctx, "read-attribute")?;
    let client = http_client(&server)?;

    let ops = online::Operations::new(&client);
    let result = ops
        .read_attribute(&address, name)
        .with_context(|| format!("Could not read {address}:{name}"))?;
    result.assert_success()?;
    println!("{}", format_value(result.value())?);
    Ok(())
}

pub fn version(ctx: &Context) -> Result<()> {
    let version = match ctx.endpoint()? {
        Endpoint::Server(server) => {
            let client = http_client(&server)?;
            online::read_version(&client)
                .with_context(|| format!("Could not read the version of {}", server.url))?
        }
        Endpoint::File(file) => open_file(&file)?.version(),
    };
    println!("{version}");
    Ok(())
}

pub fn reload(ctx: &Context, if_required: bool, timeout_secs: u64) -> Result<()> {
    let server = require_server(ctx, "reload")?;
    let client: HttpClient = http_client(&server)?;
    let admin = Administration::new(&client).with_timeout(Duration::from_secs(timeout_secs));

    if ctx.dry_run {
        ui::kv("server state", &admin.server_state()?);
        return Ok(());
    }

    if if_required {
        if admin.reload_if_required()? {
            ui::success(&format!("Reloaded {}", server.url));
        } else {
            ui::info("No reload required");
        }
        return Ok(());
    }

    if !confirm(ctx, &format!("Reload {}?", server.url))? {
        ui::warn("Cancelled");
        return Ok(());
    }
    admin.reload()?;
    ui::success(&format!("Reloaded {}", server.url));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None).unwrap(), "undefined");
        assert_eq!(format_value(Some(&Value::Null)).unwrap(), "undefined");
        assert_eq!(format_value(Some(&json!("running"))).unwrap(), "running");
        assert_eq!(format_value(Some(&json!(true))).unwrap(), "true");
        assert_eq!(format_value(Some(&json!(20))).unwrap(), "20");
    }
}
