//! Auction contract client library

pub mod auction;
pub mod blockchain;
pub mod codec;
pub mod config;
pub mod identity;
pub mod lifecycle;
pub mod observability;

pub use auction::{AuctionClient, DefaultAuctionClient};
pub use config::schema::AppConfig;
pub use lifecycle::CancelToken;
