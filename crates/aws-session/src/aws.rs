use anyhow::{anyhow, bail, Context, Result};
use aws_sdk_sts::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_sts::error::DisplayErrorContext;
use log::{debug, info};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::validate::{require, FieldError, Validate};

pub(crate) const DEFAULT_STS_REGION: &str = "us-east-1";
pub(crate) const DEFAULT_DURATION_SECONDS: i32 = 3600;

const MFA_MARKER: &str = "mfa/";

/// Short-lived credentials returned by AssumeRole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// Unix epoch seconds.
    pub expiration: i64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct AssumeRoleRequest {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub account_number: String,
    pub role_name: String,
    pub mfa_device: String,
    pub token_code: String,
    pub session_name: Option<String>,
    pub duration: i32,
    pub region: Option<String>,
}

impl Validate for AssumeRoleRequest {
    fn validate(&self) -> Result<(), FieldError> {
        require("access_key_id", &self.access_key_id)?;
        require("secret_access_key", &self.secret_access_key)?;
        require("account_number", &self.account_number)?;
        require("role_name", &self.role_name)?;
        if !self.mfa_device.is_empty() {
            require("token_code", &self.token_code)?;
        }
        Ok(())
    }
}

impl AssumeRoleRequest {
    pub(crate) fn role_arn(&self) -> String {
        format!("arn:aws:iam::{}:role/{}", self.account_number, self.role_name)
    }

    /// Caller supplied session name, or one derived from the MFA device and the current time.
    pub(crate) fn session_name(&self) -> Result<String> {
        match self.session_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name.to_string()),
            _ => generate_session_name(&self.role_name, &self.mfa_device, unix_now()?),
        }
    }
}

/// AWS account ids are always twelve digits.
pub(crate) fn account_id(account_number: u64) -> String {
    format!("{account_number:012}")
}

/// `<user>@<role>_<timestamp>`, the user being whatever follows `mfa/` in the device ARN.
pub(crate) fn generate_session_name(role_name: &str, mfa_device: &str, timestamp: u64) -> Result<String> {
    let Some((_, user)) = mfa_device.split_once(MFA_MARKER) else {
        bail!("MFA device {mfa_device} does not contain {MFA_MARKER}, unable to derive a session name");
    };
    let user = user.split(MFA_MARKER).next().unwrap_or(user);

    Ok(format!("{user}@{role_name}_{timestamp}"))
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("System clock is before the Unix epoch")?
        .as_secs())
}

pub(crate) trait RoleAssumer {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredentials>;
}

/// AWS STS, signed with the account's long-lived keys.
pub(crate) struct Sts;

impl RoleAssumer for Sts {
    async fn assume_role(&self, request: &AssumeRoleRequest) -> Result<TemporaryCredentials> {
        let role_arn = request.role_arn();
        let session_name = request.session_name()?;
        let region = request
            .region
            .clone()
            .filter(|region| !region.is_empty())
            .unwrap_or_else(|| DEFAULT_STS_REGION.to_string());

        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {role_arn}");
        debug!("Session name: {session_name}");
        debug!("Region: {region}");
        debug!("Duration: {} seconds", request.duration);

        let config = aws_sdk_sts::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(Credentials::new(
                &request.access_key_id,
                &request.secret_access_key,
                None,
                None,
                "aws-session",
            ))
            .build();
        let client = aws_sdk_sts::Client::from_conf(config);

        let mut call = client
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(session_name)
            .duration_seconds(request.duration);
        if !request.mfa_device.is_empty() {
            call = call
                .serial_number(&request.mfa_device)
                .token_code(&request.token_code);
        }

        let response = call
            .send()
            .await
            .map_err(|err| anyhow!("{}", DisplayErrorContext(&err)))?;

        let credentials = response
            .credentials()
            .context("AWS STS returned no credentials")?;

        info!("Obtained temporary credentials");
        Ok(TemporaryCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: credentials.secret_access_key().to_string(),
            session_token: credentials.session_token().to_string(),
            expiration: credentials.expiration().secs(),
        })
    }
}
