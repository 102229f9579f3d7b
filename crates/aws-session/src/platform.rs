use anyhow::{anyhow, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Password;
use directories::UserDirs;
use log::error;
use std::path::PathBuf;

const CONFIG_FILE: &str = ".aws-session/config.yaml";

pub(crate) trait TerminalPrompter {
    /// Reads an MFA token code without echoing it.
    fn mfa_token(&self) -> Result<String>;
}

pub(crate) trait DefaultPathProvider {
    fn default_config_path(&self) -> Result<PathBuf>;
}

/// Masked prompt on the controlling terminal, written to stderr so stdout stays clean.
pub(crate) struct Terminal;

impl TerminalPrompter for Terminal {
    fn mfa_token(&self) -> Result<String> {
        let token = Password::with_theme(&ColorfulTheme::default())
            .with_prompt("MFA Token")
            .interact()?;

        Ok(token.trim().to_string())
    }
}

/// Resolves the home directory for the running platform.
pub(crate) struct HomeDirectory;

impl DefaultPathProvider for HomeDirectory {
    fn default_config_path(&self) -> Result<PathBuf> {
        let user_dirs = UserDirs::new().ok_or_else(|| {
            let err = "Unable to find the user directory";
            error!("{err}");
            anyhow!(err)
        })?;

        Ok(user_dirs.home_dir().join(CONFIG_FILE))
    }
}
