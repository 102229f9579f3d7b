use anyhow::{bail, Context, Result};
use log::{debug, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::aws::TemporaryCredentials;

const FEDERATION_ENDPOINT: &str = "https://signin.aws.amazon.com/federation";
const CONSOLE_DESTINATION: &str = "https://console.aws.amazon.com/";
const ISSUER: &str = "aws-session";

/// Session document expected by `getSigninToken`.
#[derive(Debug, Serialize)]
struct SessionCredentials<'a> {
    #[serde(rename = "sessionId")]
    session_id: &'a str,
    #[serde(rename = "sessionKey")]
    session_key: &'a str,
    #[serde(rename = "sessionToken")]
    session_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct SigninTokenResponse {
    #[serde(rename = "SigninToken")]
    signin_token: String,
}

/// AWS federation endpoint, exchanging temporary credentials for a Console sign-in URL.
pub(crate) struct Federation {
    client: Client,
    endpoint: Url,
}

impl Federation {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            endpoint: Url::parse(FEDERATION_ENDPOINT)?,
        })
    }

    pub(crate) async fn console_url(&self, credentials: &TemporaryCredentials, duration: i32) -> Result<String> {
        let token = self.signin_token(credentials, duration).await?;

        info!("Obtained Console sign-in token");
        Ok(self.login_url(&token).to_string())
    }

    async fn signin_token(&self, credentials: &TemporaryCredentials, duration: i32) -> Result<String> {
        let url = self.signin_token_url(credentials, duration)?;
        debug!("Requesting sign-in token from {}", self.endpoint);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to get signin token")?;

        if !response.status().is_success() {
            bail!("Failed to get signin token: {}", response.status());
        }

        let body = response.text().await.context("Failed to read signin token response")?;
        let token: SigninTokenResponse =
            serde_json::from_str(&body).context("Failed to parse signin token response")?;

        Ok(token.signin_token)
    }

    fn signin_token_url(&self, credentials: &TemporaryCredentials, duration: i32) -> Result<Url> {
        let session = serde_json::to_string(&SessionCredentials {
            session_id: &credentials.access_key_id,
            session_key: &credentials.secret_access_key,
            session_token: &credentials.session_token,
        })?;

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("Action", "getSigninToken")
            .append_pair("SessionDuration", &duration.to_string())
            .append_pair("Session", &session);

        Ok(url)
    }

    fn login_url(&self, token: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("Action", "login")
            .append_pair("Issuer", ISSUER)
            .append_pair("Destination", CONSOLE_DESTINATION)
            .append_pair("SigninToken", token);

        url
    }
}
