use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::aws::DEFAULT_DURATION_SECONDS;
use crate::export::Shell;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// Alias configuration file [default: ~/.aws-session/config.yaml]
    #[arg(short, long, global = true, env = "AWS_SESSION_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn new() -> Self {
        Self::parse()
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List available aliases
    List,

    /// Print temporary credentials as shell environment variables
    Auth(AuthArgs),

    /// Print an AWS Console sign-in URL
    Web(SessionArgs),
}

/// Flags shared by every command that assumes a role.
#[derive(clap::Args, Debug)]
pub(crate) struct SessionArgs {
    /// Alias to fetch credentials for
    #[arg(short = 'A', long, env = "AWS_SESSION_ALIAS")]
    pub alias: String,

    /// MFA token code, prompted for when missing
    #[arg(short = 'T', long, env = "AWS_SESSION_TOKEN_CODE")]
    pub token_code: Option<String>,

    /// Session name, generated from the MFA device when missing
    #[arg(short = 'n', long)]
    pub session_name: Option<String>,

    /// Credential duration in seconds
    #[arg(short, long, default_value_t = DEFAULT_DURATION_SECONDS, value_parser = clap::value_parser!(i32).range(1..))]
    pub duration: i32,
}

#[derive(clap::Args, Debug)]
pub(crate) struct AuthArgs {
    #[command(flatten)]
    pub session: SessionArgs,

    /// AWS region to include in the environment variables
    #[arg(short, long, env = "AWS_SESSION_REGION")]
    pub region: Option<String>,

    /// Output format [default: powershell on Windows, bash elsewhere]
    #[arg(short = 'F', long, value_enum)]
    pub format: Option<Shell>,
}
