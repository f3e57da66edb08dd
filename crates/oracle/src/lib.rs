pub mod chat;
pub mod news;

pub use chat::ChatOracle;
pub use news::{HttpNewsFeed, FALLBACK_NEWS, NO_RECENT_NEWS};
