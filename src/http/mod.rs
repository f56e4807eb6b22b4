//! Rate-limited HTTP client
//!
//! All API traffic goes through [`ApiClient`], which composes a token
//! bucket rate limiter (innermost) with an exponential-backoff retry loop
//! (outermost) around a single bearer-authenticated GET primitive.

mod client;
mod rate_limit;

pub use client::{ApiClient, ApiClientConfig, ApiClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};


/// Production API host
pub const BASE_URL: &str = "https://api.hubapi.com";
