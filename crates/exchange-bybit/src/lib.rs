pub mod client;
pub mod exchange;
pub mod models;
pub mod signing;

pub use client::{ApiError, BybitClient};
pub use exchange::LEVERAGE_NOT_MODIFIED;
