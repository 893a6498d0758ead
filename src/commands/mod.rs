//! Command handlers
//!
//! Every configuration command goes through [`run`], which resolves the
//! target, connects to it and either applies the command or previews it.

pub mod datasource;
pub mod driver;
pub mod realm;
pub mod server;
pub mod targets;

use crate::Context;
use crate::config::{Endpoint, FileEndpoint, ServerEndpoint};
use crate::ui;
use anyhow::{Context as _, Result};
use management::{Command, OfflineContext, OnlineContext, Target};
use offline::ConfigFile;
use online::HttpClient;

/// Apply `command` to the selected target, or preview it with `--dry-run`
pub fn run(ctx: &Context, command: &dyn Command) -> Result<()> {
    match ctx.endpoint()? {
        Endpoint::Server(server) => {
            let client = http_client(&server)?;
            let online = OnlineContext::connect(&client)
                .with_context(|| format!("Could not connect to {}", server.url))?;
            run_on(ctx, command, Target::Online(&online))
        }
        Endpoint::File(file) => {
            let offline = open_file(&file)?;
            run_on(ctx, command, Target::Offline(&offline))
        }
    }
}

fn run_on(ctx: &Context, command: &dyn Command, target: Target<'_>) -> Result<()> {
    log::info!(
        "{} on {} (model {})",
        command.describe(),
        target.describe(),
        target.version()
    );

    if ctx.dry_run {
        return preview(command, target);
    }

    if let Err(err) = management::apply(command, target) {
        if !ctx.quiet {
            ui::dim(err.category().advice());
        }
        return Err(err).with_context(|| format!("Failed to {}", command.describe()));
    }

    if !ctx.quiet {
        ui::success(&format!("{} ({})", capitalize(&command.describe()), target.describe()));
    }
    Ok(())
}

/// Show the request or the document diff without changing anything
fn preview(command: &dyn Command, target: Target<'_>) -> Result<()> {
    ui::header(&format!("Dry run: {}", command.describe()));
    match target {
        Target::Online(online) => {
            command.check_online(online)?;
            let batch = command.render_batch(online.version());
            let request = serde_json::to_string_pretty(&batch.to_operation().to_model())?;
            println!("{request}");
        }
        Target::Offline(offline) => {
            let transform = command.render_transform(offline.version());
            let (before, after) = offline.file().preview(&transform)?;
            ui::diff(&before, &after);
        }
    }
    Ok(())
}

/// Ask before a destructive change; `--yes` and `--dry-run` skip the prompt
pub fn confirm(ctx: &Context, prompt: &str) -> Result<bool> {
    if ctx.yes || ctx.dry_run {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(confirmed)
}

/// HTTP client for a server target, prompting for a missing password
pub fn http_client(server: &ServerEndpoint) -> Result<HttpClient> {
    let client = HttpClient::new(&server.url).with_timeout(server.timeout);
    let Some(user) = server.user.as_deref() else {
        return Ok(client);
    };
    let password = match &server.password {
        Some(password) => password.clone(),
        None => dialoguer::Password::new()
            .with_prompt(format!("Password for {user}"))
            .interact()
            .context("No password given (set WILDCFG_PASSWORD to skip the prompt)")?,
    };
    Ok(client.with_credentials(user, &password))
}

/// Offline context for a file target
pub fn open_file(file: &FileEndpoint) -> Result<OfflineContext> {
    let context = match file.version {
        Some(version) => OfflineContext::with_version(ConfigFile::new(&file.path), version),
        None => OfflineContext::open(&file.path)
            .with_context(|| format!("Could not open {}", file.path.display()))?,
    };
    Ok(context)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split `KEY=VALUE`
pub fn parse_key_value(input: &str) -> Result<(String, String)> {
    let (key, value) = input
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{input}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

// ============================================================================
// Tests
// ============================================================================
