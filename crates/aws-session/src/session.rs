use anyhow::{bail, Result};
use log::{debug, info};

use crate::aws::{account_id, AssumeRoleRequest, RoleAssumer, TemporaryCredentials};
use crate::cli::{AuthArgs, SessionArgs};
use crate::config::{Alias, Config, SecurityCredentials};
use crate::console::Federation;
use crate::export::{EnvVariables, Shell};
use crate::platform::TerminalPrompter;
use crate::validate::{require, require_record, FieldError, Validate};

/// One role assumption on behalf of a named alias.
#[derive(Debug, Clone)]
struct RoleSession {
    account_name: String,
    request: AssumeRoleRequest,
}

impl Validate for RoleSession {
    fn validate(&self) -> Result<(), FieldError> {
        require("account_name", &self.account_name)?;
        require_record(&self.request)?;
        Ok(())
    }
}

/// Alias names, one per line.
pub(crate) fn list(config: &Config) -> String {
    config
        .alias_names()
        .into_iter()
        .map(|name| format!("{name}\n"))
        .collect()
}

/// Shell exports for the alias named in `args`.
pub(crate) async fn auth(
    config: &Config,
    args: &AuthArgs,
    prompter: &impl TerminalPrompter,
    sts: &impl RoleAssumer,
) -> Result<String> {
    let (alias, credentials) = lookup(config, &args.session)?;
    let region = resolve_region(alias, args.region.as_deref());
    let session = role_session(alias, &credentials, &args.session, region.clone(), prompter)?;

    let temporary = assume(&session, sts).await?;

    let shell = args.format.unwrap_or_else(Shell::detect);
    debug!("Rendering credentials for {shell:?}");
    let env = EnvVariables {
        account_id: session.request.account_number,
        account_name: session.account_name,
        credentials: temporary,
        region,
    };

    Ok(env.render(shell))
}

/// AWS Console sign-in URL for the alias named in `args`.
pub(crate) async fn web(
    config: &Config,
    args: &SessionArgs,
    prompter: &impl TerminalPrompter,
    sts: &impl RoleAssumer,
    federation: &Federation,
) -> Result<String> {
    let (alias, credentials) = lookup(config, args)?;
    let region = Some(alias.default_region.clone()).filter(|region| !region.is_empty());
    let session = role_session(alias, &credentials, args, region, prompter)?;

    let temporary = assume(&session, sts).await?;

    federation.console_url(&temporary, args.duration).await
}

fn lookup<'a>(config: &'a Config, args: &SessionArgs) -> Result<(&'a Alias, SecurityCredentials)> {
    if args.alias.is_empty() {
        bail!("alias flag can not be empty");
    }

    config.get_alias(&args.alias)
}

/// The alias' default region overrides the region flag when set.
fn resolve_region(alias: &Alias, flag: Option<&str>) -> Option<String> {
    if !alias.default_region.is_empty() {
        return Some(alias.default_region.clone());
    }

    flag.filter(|region| !region.is_empty()).map(String::from)
}

/// Supplied token code, or a prompt when the account has an MFA device.
fn token_code(
    credentials: &SecurityCredentials,
    supplied: Option<&str>,
    prompter: &impl TerminalPrompter,
) -> Result<String> {
    match supplied.filter(|code| !code.is_empty()) {
        Some(code) => Ok(code.to_string()),
        None if !credentials.mfa_role.is_empty() => prompter.mfa_token(),
        None => Ok(String::new()),
    }
}

fn role_session(
    alias: &Alias,
    credentials: &SecurityCredentials,
    args: &SessionArgs,
    region: Option<String>,
    prompter: &impl TerminalPrompter,
) -> Result<RoleSession> {
    let token_code = token_code(credentials, args.token_code.as_deref(), prompter)?;

    Ok(RoleSession {
        account_name: alias.name.clone(),
        request: AssumeRoleRequest {
            access_key_id: credentials.aws_access_key_id.clone(),
            secret_access_key: credentials.aws_secret_access_key.clone(),
            account_number: account_id(alias.account_number),
            role_name: alias.role.clone(),
            mfa_device: credentials.mfa_role.clone(),
            token_code,
            session_name: args.session_name.clone(),
            duration: args.duration,
            region,
        },
    })
}

async fn assume(session: &RoleSession, sts: &impl RoleAssumer) -> Result<TemporaryCredentials> {
    session.validate()?;

    info!("Assuming {} for alias {}", session.request.role_arn(), session.account_name);
    sts.assume_role(&session.request).await
}
