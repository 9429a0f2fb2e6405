//! `scangate login`: store an API token in the config file.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::config_service;

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// API token; prompted for when omitted
    #[arg(long, env = "SCANGATE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

/// Run the login command.
pub fn run(app: &AppContext, args: &LoginArgs) -> Result<ExitCode> {
    let token = match args.token.as_deref() {
        Some(token) => token.to_string(),
        None => app.prompt_secret("API token")?,
    };
    config_service::set_value(&app.config_store, "api.token", &token)?;
    let path = app.config_store.path()?;
    app.output.success(&format!("Token saved to {}", path.display()));
    Ok(ExitCode::SUCCESS)
}
