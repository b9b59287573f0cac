//! Auction contract client.
//!
//! # Data Flow
//! ```text
//! CLI command
//!     → client.rs (AuctionClient: typed params, cache invalidation)
//!     → identity (signature for mint)
//!     → blockchain (invoke for reads, lifecycle for updates)
//! ```

pub mod cache;
pub mod client;
pub mod types;

use thiserror::Error;

use crate::blockchain::types::{ChainError, InvokeError, LifecycleError};
use crate::blockchain::wallet::WalletError;
use crate::codec::CodecError;
use crate::identity::IdentityError;

pub use cache::{ParticipationCache, ParticipationKey};
pub use client::{AuctionClient, DefaultAuctionClient};
pub use types::{TokenId, ViewState};

/// Errors surfaced by [`AuctionClient`].
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("Invalid token id '{input}': {reason}")]
    InvalidTokenId { input: String, reason: String },

    /// No contract index configured or set.
    #[error("No contract instance selected")]
    NoContract,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Chain(#[from] ChainError),
}

pub type AuctionResult<T> = Result<T, AuctionError>;
