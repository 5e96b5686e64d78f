//! Web searcher implementations.

pub mod rate_limited;
pub mod serper;

pub use rate_limited::RateLimitedSearcher;
pub use serper::SerperWebSearcher;
