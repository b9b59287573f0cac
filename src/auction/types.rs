//! Auction contract parameter and view types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auction::AuctionError;
use crate::blockchain::types::ContractAddress;

/// Bytes in the contract's token id.
pub const TOKEN_ID_BYTES: usize = 4;

/// Auction token id: up to four bytes, held as eight lowercase hex digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TokenId(String);

impl TokenId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TokenId {
    type Err = AuctionError;

    /// `"01"` → `00000001`. Odd-length, non-hex, empty, and over-long input is
    /// rejected.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| AuctionError::InvalidTokenId {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("empty"));
        }
        let bytes = hex::decode(input).map_err(|e| invalid(&e.to_string()))?;
        if bytes.len() > TOKEN_ID_BYTES {
            return Err(invalid(&format!("longer than {} bytes", TOKEN_ID_BYTES)));
        }

        let mut padded = [0u8; TOKEN_ID_BYTES];
        padded[TOKEN_ID_BYTES - bytes.len()..].copy_from_slice(&bytes);
        Ok(TokenId(hex::encode(padded)))
    }
}

impl TryFrom<String> for TokenId {
    type Error = AuctionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TokenId> for String {
    fn from(id: TokenId) -> Self {
        id.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An account or contract, in the contract's JSON form
/// (`{"Account": ["..."]}`, `{"Contract": [{"index": .., "subindex": ..}]}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Address {
    Account([String; 1]),
    Contract([ContractAddress; 1]),
}

impl Address {
    pub fn account(address: &str) -> Self {
        Address::Account([address.to_string()])
    }

    pub fn as_account(&self) -> Option<&str> {
        match self {
            Address::Account([account]) => Some(account),
            Address::Contract(_) => None,
        }
    }
}

/// Holdings and operators of one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewAddressState {
    pub balances: Vec<TokenId>,
    pub operators: Vec<Address>,
}

/// Return value of the contract's `view` entrypoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub state: Vec<(Address, ViewAddressState)>,
    pub tokens: Vec<TokenId>,
}

impl ViewState {
    /// Tokens currently held by `account`.
    pub fn balances_of(&self, account: &str) -> &[TokenId] {
        self.state
            .iter()
            .find(|(address, _)| address.as_account() == Some(account))
            .map(|(_, state)| state.balances.as_slice())
            .unwrap_or(&[])
    }
}

/// Metadata attached to an auction token at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub url: String,
    pub hash: String,
}

impl TokenMetadata {
    /// Metadata pointing at the token id itself, without a hash.
    pub fn for_token(token: &TokenId) -> Self {
        Self {
            url: token.to_string(),
            hash: String::new(),
        }
    }
}

/// One query of `balanceOf`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceOfQuery {
    pub token_id: TokenId,
    pub address: Address,
}

/// Parameter of `mint`: join the auctions for `tokens`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintParams {
    pub tokens: Vec<TokenId>,
    /// Verifier signature over the sender's account, hex.
    pub signature: String,
}

/// Parameter of `burn`: leave the auction for `token_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnParams {
    pub token_id: TokenId,
}

/// Parameter of `init_auction`: token id → (metadata, supply) pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionInitParams {
    pub tokens: Vec<(TokenId, (TokenMetadata, String))>,
}

impl AuctionInitParams {
    pub fn single(token: TokenId, quantity: u64) -> Self {
        let metadata = TokenMetadata::for_token(&token);
        Self {
            tokens: vec![(token, (metadata, quantity.to_string()))],
        }
    }
}

/// Parameter of `burn_auction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionBurnParams {
    pub tokens: Vec<TokenId>,
}

/// Init parameter of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitParams {
    /// Ed25519 key the contract checks verifier signatures against, hex.
    pub verify_key: String,
}
