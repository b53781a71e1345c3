use std::{collections::HashMap, env, fmt};

use thiserror::Error;

use crate::{
    auth::client_credentials::ClientCredentials,
    client::{Client, DEFAULT_BASE_URL},
};

pub const BASE_URL_VAR: &str = "BEARER_CLIENT_BASE_URL";
pub const TOKEN_URL_VAR: &str = "OAUTH_TOKEN_URL";
pub const CLIENT_ID_VAR: &str = "OAUTH_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "OAUTH_CLIENT_SECRET";

#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let base_url = vars
            .get(BASE_URL_VAR)
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(Config {
            base_url,
            token_url: vars.get(TOKEN_URL_VAR).cloned(),
            client_id: vars.get(CLIENT_ID_VAR).cloned(),
            client_secret: vars.get(CLIENT_SECRET_VAR).cloned(),
        })
    }

    /// Client credentials provider for the configured token endpoint.
    pub fn client_credentials(
        &self,
        client: reqwest::Client,
    ) -> Result<ClientCredentials, ConfigError> {
        let require = |value: &Option<String>, var: &str| {
            value
                .clone()
                .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
        };

        Ok(ClientCredentials {
            client,
            token_url: require(&self.token_url, TOKEN_URL_VAR)?,
            client_id: require(&self.client_id, CLIENT_ID_VAR)?,
            client_secret: require(&self.client_secret, CLIENT_SECRET_VAR)?,
        })
    }

    /// Client that refreshes through the configured token endpoint, sharing
    /// one reqwest session for both token and API traffic.
    pub fn build_client(
        &self,
        session: reqwest::Client,
    ) -> Result<Client<ClientCredentials>, ConfigError> {
        let provider = self.client_credentials(session.clone())?;
        Ok(Client::with_parts(provider, session, self.base_url.clone()))
    }
}
