pub mod client;
pub mod envelope;
pub mod error;
pub mod http;
pub mod rate_limiter;

pub use client::{ConnectionStatus, DashboardApi, TradeHistoryQuery};
pub use error::ApiError;
pub use http::ApiClient;
pub use rate_limiter::{RateLimitConfig, RateLimiter};
