// netop-api: Async Rust client for the NetOp incident API and identity provider

pub mod client;
pub mod error;
pub mod identity;
pub mod models;
pub mod transport;

mod incidents;
mod sites;
mod users;

pub use client::ApiClient;
pub use error::Error;
pub use identity::{IdentityClient, IdentityConfig, TokenResponse, UserInfo};
pub use transport::TransportConfig;
