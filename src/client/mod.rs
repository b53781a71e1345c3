//! Bearer-authenticated request preparation.

pub mod shared;

use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION},
    Method, Url,
};
use tracing::{debug, info};

use crate::{
    auth::{fixed::FixedTokenProvider, token, RawToken, Token, TokenProvider},
    transport::Transport,
};

pub const DEFAULT_BASE_URL: &str = "https://example.com";

/// The token a client currently holds, in whichever shape it arrived.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TokenSlot {
    #[default]
    Absent,
    /// Not validated yet; promoted or discarded on the next API call.
    Raw(RawToken),
    Token(Token),
}

impl TokenSlot {
    pub fn token(&self) -> Option<&Token> {
        match self {
            TokenSlot::Token(token) => Some(token),
            TokenSlot::Absent | TokenSlot::Raw(_) => None,
        }
    }
}

impl From<Token> for TokenSlot {
    fn from(token: Token) -> Self {
        TokenSlot::Token(token)
    }
}

impl From<RawToken> for TokenSlot {
    fn from(raw: RawToken) -> Self {
        TokenSlot::Raw(raw)
    }
}

impl From<Option<Token>> for TokenSlot {
    fn from(token: Option<Token>) -> Self {
        token.map_or(TokenSlot::Absent, TokenSlot::Token)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error<AuthError> {
    #[error("auth: {0}")]
    Auth(#[source] AuthError),
    #[error("invalid authorization header: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("transport: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Only API calls get a token attached.
    pub is_api_call: bool,
    pub headers: HeaderMap,
}

impl RequestOptions {
    pub fn api() -> Self {
        Self {
            is_api_call: true,
            headers: HeaderMap::new(),
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// What the transport would send for a request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
}

/// HTTP client that attaches a bearer token to API calls, refreshing it
/// through `Provider` whenever the held one is missing or unusable.
pub struct Client<Provider = FixedTokenProvider, Session = reqwest::Client> {
    slot: TokenSlot,
    provider: Provider,
    session: Session,
    base_url: String,
}

impl Client {
    /// Client with the placeholder provider and a fresh reqwest session.
    pub fn new() -> Self {
        Self::with_parts(
            FixedTokenProvider::default(),
            reqwest::Client::new(),
            DEFAULT_BASE_URL,
        )
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl<Provider, Session> Client<Provider, Session>
where
    Provider: TokenProvider,
    Session: Transport,
{
    pub fn with_parts(provider: Provider, session: Session, base_url: impl Into<String>) -> Self {
        Self {
            slot: TokenSlot::Absent,
            provider,
            session,
            base_url: base_url.into(),
        }
    }

    pub fn token_slot(&self) -> &TokenSlot {
        &self.slot
    }

    pub fn token_slot_mut(&mut self) -> &mut TokenSlot {
        &mut self.slot
    }

    pub fn set_token_slot(&mut self, slot: impl Into<TokenSlot>) {
        self.slot = slot.into();
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    /// The transport session, reused by every request.
    pub fn transport(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replace the held token with a new one from the provider.
    ///
    /// On failure the slot keeps whatever it held before.
    pub async fn refresh(&mut self) -> Result<(), Error<Provider::Error>> {
        let token = self
            .provider
            .get_auth_token()
            .await
            .map_err(Error::Auth)?;

        debug!(message = "Got new token", token_expires_at = token.expires_at);

        self.slot = TokenSlot::Token(token);
        Ok(())
    }

    /// Bring the slot into a usable state and return the token to send.
    async fn authorize(&mut self, now: i64) -> Result<Option<&Token>, Error<Provider::Error>> {
        match &self.slot {
            TokenSlot::Absent => {
                info!(
                    message = "No active token found, about to get a new one",
                    token_is_stale = false,
                );
                self.refresh().await?;
            }
            TokenSlot::Raw(raw) => match raw.promote() {
                Some(token) => {
                    debug!(message = "Promoting stored token", token_expires_at = token.expires_at);
                    self.slot = TokenSlot::Token(token);
                }
                None => {
                    info!(
                        message = "Stored token is unusable, about to get a new one",
                        token_is_stale = true,
                        token_expires_at = ?raw.expires_at,
                    );
                    self.refresh().await?;
                }
            },
            TokenSlot::Token(token) if token.is_expired(now) => {
                debug!(
                    message = "Existing token expired, refreshing",
                    token_expires_at = token.expires_at,
                );
                self.refresh().await?;
            }
            TokenSlot::Token(token) => {
                debug!(
                    message = "Using preexisting token",
                    token_expires_at = token.expires_at,
                );
            }
        }

        Ok(self.slot.token())
    }

    /// Prepare a request against `base_url` + `path`.
    ///
    /// For API calls the held token is reused, promoted or refreshed first and
    /// sent as `Authorization`. Other calls never touch the token.
    pub async fn request(
        &mut self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, Error<Provider::Error>> {
        let RequestOptions {
            is_api_call,
            mut headers,
        } = options;

        if is_api_call {
            let authorization = self.authorize(token::now()).await?.map(Token::as_header);
            if let Some(authorization) = authorization {
                let mut value = HeaderValue::from_str(&authorization)?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
        }

        let url = Url::parse(&format!("{}{}", self.base_url, path))?;
        let headers = self
            .session
            .prepare(method.clone(), url, headers)
            .map_err(|err| Error::Transport(Box::new(err)))?;

        Ok(RequestDescriptor {
            method,
            path: path.to_owned(),
            headers,
        })
    }
}
