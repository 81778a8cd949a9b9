// whes-api: Async signed client for the WHES battery cloud metrics API

pub mod canonical;
pub mod client;
pub mod error;
pub mod sign;
pub mod transport;
pub mod wire;

pub use client::{CredentialCheck, Installation, WhesClient};
pub use error::Error;
pub use sign::ApiCredentials;
pub use transport::TransportConfig;
