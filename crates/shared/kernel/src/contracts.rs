//! Startup wiring of the contract resolver.

use crate::server::scope::TaskLocalAccessor;
use polycase_contract::{
    ContractPolicies, ContractResolver, DynamicNamingSelector, MemoryContractCache,
};
use polycase_domain::config::ContractsConfig;
use std::sync::Arc;
use tracing::info;

/// Host policy defaults taken from configuration.
#[must_use]
pub const fn contract_policies(config: &ContractsConfig) -> ContractPolicies {
    ContractPolicies {
        skip_null: config.skip_null,
        skip_default: config.skip_default,
        ignore_reference_cycles: config.ignore_reference_cycles,
    }
}

/// Builds the process-wide resolver.
///
/// The selector reads request headers from the task-local scope installed by
/// [`request_scope`](crate::server::request_scope), and contracts are kept in
/// a never-expiring in-memory cache.
#[must_use]
pub fn wire_contracts(config: &ContractsConfig) -> Arc<ContractResolver> {
    let policies = contract_policies(config);
    info!(
        skip_null = policies.skip_null,
        skip_default = policies.skip_default,
        ignore_reference_cycles = policies.ignore_reference_cycles,
        "Wiring contract resolver"
    );

    Arc::new(
        ContractResolver::new(policies)
            .bind_selector(DynamicNamingSelector::new(Arc::new(TaskLocalAccessor)))
            .bind_cache(Arc::new(MemoryContractCache::new())),
    )
}
