//! OAuth2 bearer-token handling for an HTTP client.
//!
//! A [`Client`] keeps a single token slot and decides on every API-bound
//! request whether the cached token can be reused, must be promoted from its
//! raw stored shape, or must be refreshed through a [`TokenProvider`].

pub mod auth;
pub mod client;
pub mod config;
pub mod transport;

pub use self::{
    auth::{RawToken, Token, TokenProvider},
    client::{shared::SharedClient, Client, Error, RequestDescriptor, RequestOptions, TokenSlot},
    config::Config,
    transport::Transport,
};
