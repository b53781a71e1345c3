use reqwest::Method;
use tokio::sync::Mutex;

use super::{Client, Error, RequestDescriptor, RequestOptions, TokenSlot};
use crate::{
    auth::{fixed::FixedTokenProvider, TokenProvider},
    transport::Transport,
};

/// A [`Client`] that can be used from many tasks at once.
///
/// The lock is held from the token decision through any refresh and the
/// request preparation, so concurrent callers never refresh redundantly.
pub struct SharedClient<Provider = FixedTokenProvider, Session = reqwest::Client> {
    client: Mutex<Client<Provider, Session>>,
}

impl<Provider, Session> SharedClient<Provider, Session>
where
    Provider: TokenProvider,
    Session: Transport,
{
    pub fn new(client: Client<Provider, Session>) -> Self {
        let client = Mutex::new(client);
        Self { client }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<RequestDescriptor, Error<Provider::Error>> {
        let mut client = self.client.lock().await;
        client.request(method, path, options).await
    }

    pub async fn refresh(&self) -> Result<(), Error<Provider::Error>> {
        let mut client = self.client.lock().await;
        client.refresh().await
    }

    pub async fn token_slot(&self) -> TokenSlot {
        self.client.lock().await.token_slot().clone()
    }

    pub async fn set_token_slot(&self, slot: impl Into<TokenSlot>) {
        self.client.lock().await.set_token_slot(slot);
    }

    pub fn into_inner(self) -> Client<Provider, Session> {
        self.client.into_inner()
    }
}

impl<Provider, Session> From<Client<Provider, Session>> for SharedClient<Provider, Session>
where
    Provider: TokenProvider,
    Session: Transport,
{
    fn from(client: Client<Provider, Session>) -> Self {
        Self::new(client)
    }
}
