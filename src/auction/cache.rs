//! Participation caching.

use dashmap::DashMap;
use std::sync::Arc;

use crate::auction::types::TokenId;
use crate::blockchain::types::ContractAddress;
use crate::observability::metrics;

/// Cache key: one account's participation in one token's auction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParticipationKey {
    pub contract: ContractAddress,
    pub account: String,
    pub token: TokenId,
}

impl ParticipationKey {
    pub fn new(contract: ContractAddress, account: &str, token: &TokenId) -> Self {
        Self {
            contract,
            account: account.to_string(),
            token: token.clone(),
        }
    }
}

/// A thread-safe read-through cache of participation lookups.
///
/// Values are the lookup result itself, so "unknown" (`None`) is cached too.
/// Entries live until explicitly invalidated.
#[derive(Debug, Clone, Default)]
pub struct ParticipationCache {
    inner: Arc<DashMap<ParticipationKey, Option<bool>>>,
}

impl ParticipationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached result, if any. The outer `Option` is presence in the cache.
    pub fn get(&self, key: &ParticipationKey) -> Option<Option<bool>> {
        let cached = self.inner.get(key).map(|r| *r.value());
        metrics::record_cache_lookup(cached.is_some());
        cached
    }

    pub fn insert(&self, key: ParticipationKey, participating: Option<bool>) {
        self.inner.insert(key, participating);
        metrics::record_cache_size(self.inner.len());
    }

    /// Drop the entry for `key`; the next lookup goes to the chain.
    pub fn invalidate(&self, key: &ParticipationKey) {
        if self.inner.remove(key).is_some() {
            tracing::debug!(
                contract = %key.contract,
                account = %key.account,
                token = %key.token,
                "Participation cache entry invalidated"
            );
        }
        metrics::record_cache_size(self.inner.len());
    }

    /// Drop every entry for a contract instance.
    pub fn invalidate_contract(&self, contract: ContractAddress) {
        self.inner.retain(|key, _| key.contract != contract);
        metrics::record_cache_size(self.inner.len());
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
