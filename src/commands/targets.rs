use crate::config::Config;
use crate::{paths, ui};
use anyhow::Result;
use colored::Colorize;

/// List the targets in `config.toml`
pub fn list() -> Result<()> {
    let config = Config::load()?;
    let path = paths::config_file()?;

    if config.targets.is_empty() {
        ui::info(&format!("No targets configured in {}", path.display()));
        ui::dim("Add [targets.<name>] with url = \"...\" or file = \"...\"");
        return Ok(());
    }

    ui::header("Targets");
    for (name, target) in &config.targets {
        let label = if config.default_target.as_deref() == Some(name.as_str()) {
            format!("{} {}", name.bold(), "(default)".green())
        } else {
            name.clone()
        };
        let kind = if target.url.is_some() { "server" } else { "file" };
        ui::kv(&label, &format!("{} {}", kind.dimmed(), target.location()));
    }
    ui::dim(&format!("from {}", path.display()));
    Ok(())
}
