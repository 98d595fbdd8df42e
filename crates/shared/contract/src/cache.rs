//! Process-wide store of built contracts.
//!
//! The key space is bounded by the four conventions times the number of
//! described types, so entries are kept for the lifetime of the process:
//! no TTL, no idle expiry and no capacity bound.

use crate::contract::SerializationContract;
use crate::error::ContractError;
use crate::naming::NamingConvention;
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;

/// `(convention, type)` identity of a cached contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    convention: NamingConvention,
    type_name: &'static str,
}

impl CacheKey {
    #[must_use]
    pub const fn new(convention: NamingConvention, type_name: &'static str) -> Self {
        Self { convention, type_name }
    }

    #[must_use]
    pub const fn convention(&self) -> NamingConvention {
        self.convention
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.convention, self.type_name)
    }
}

/// Builder invoked by [`ContractCache::get_or_create`] on a miss.
pub type ContractBuild<'a> = dyn Fn() -> Result<SerializationContract, ContractError> + 'a;

/// Populate-once, never-expire storage for contracts.
///
/// Implementations guarantee that every caller observes the same contract
/// for a key once it is populated, and that a failed build leaves the key
/// unpopulated.
pub trait ContractCache: Send + Sync + fmt::Debug {
    /// Returns the contract stored under `key`, running `build` on a miss.
    ///
    /// # Errors
    /// Propagates the builder's error; nothing is stored in that case.
    fn get_or_create(
        &self,
        key: CacheKey,
        build: &ContractBuild<'_>,
    ) -> Result<Arc<SerializationContract>, ContractError>;

    /// Looks a key up without building.
    fn get(&self, key: &CacheKey) -> Option<Arc<SerializationContract>>;

    /// Number of stored contracts.
    fn len(&self) -> u64;
}

/// In-memory [`ContractCache`] backed by `moka`.
///
/// Concurrent misses on one key are coalesced: a single caller runs the
/// builder while the others wait for its result. Hits do not take a lock.
#[derive(Debug, Clone)]
pub struct MemoryContractCache {
    entries: Cache<CacheKey, Arc<SerializationContract>>,
}

impl MemoryContractCache {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Cache::builder().name("polycase-contracts").build() }
    }
}

impl Default for MemoryContractCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractCache for MemoryContractCache {
    fn get_or_create(
        &self,
        key: CacheKey,
        build: &ContractBuild<'_>,
    ) -> Result<Arc<SerializationContract>, ContractError> {
        // Coalesced waiters share one `Arc` of the builder's error.
        self.entries.try_get_with(key, || build().map(Arc::new)).map_err(Arc::unwrap_or_clone)
    }

    fn get(&self, key: &CacheKey) -> Option<Arc<SerializationContract>> {
        self.entries.get(key)
    }

    fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}
