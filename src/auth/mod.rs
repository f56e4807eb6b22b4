//! OAuth token management
//!
//! HubSpot access tokens are short-lived; the tap holds the current token
//! and exchanges the refresh token for a new one on demand.

mod token;

pub use token::TokenManager;

#[cfg(test)]
mod tests;

/// OAuth token endpoint, relative to the API host
pub const TOKEN_PATH: &str = "/oauth/v1/token";
