//! Path resolution for wildcfg
//!
//! # Environment Variables
//!
//! - `WILDCFG_CONFIG_DIR` - Override config directory (e.g., `~/dotfiles/wildcfg`)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `WILDCFG_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/wildcfg` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\wildcfg`
//!    - macOS/Linux: `~/.config/wildcfg`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "WILDCFG_CONFIG_DIR";

const APP_DIR: &str = "wildcfg";

/// Get the wildcfg config directory path
pub fn config_dir() -> Result<PathBuf> {
    // 1. Check environment variable override
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    // 2. Check XDG_CONFIG_HOME
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join(APP_DIR);
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    // 3. Platform default
    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join(APP_DIR);
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join(APP_DIR);
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Path of `config.toml` inside the config directory
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Expand `~` and environment variables in a path
///
/// Unresolvable variables leave the input untouched.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// This function uses unsafe env::set_var/remove_var which can cause issues
    /// if other threads read environment variables concurrently.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Tests run in isolation and don't read env vars concurrently
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/wildcfg", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/wildcfg"));
            assert_eq!(
                config_file().unwrap(),
                PathBuf::from("/custom/wildcfg/config.toml")
            );
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(
            expand("~/servers/standalone.xml"),
            home.join("servers").join("standalone.xml")
        );
    }

    #[test]
    fn test_expand_plain_path() {
        assert_eq!(
            expand("/opt/server/standalone.xml"),
            PathBuf::from("/opt/server/standalone.xml")
        );
    }

    #[test]
    fn test_expand_unknown_variable_is_kept() {
        assert_eq!(
            expand("$WILDCFG_SURELY_UNSET_VAR/x"),
            PathBuf::from("$WILDCFG_SURELY_UNSET_VAR/x")
        );
    }
}
