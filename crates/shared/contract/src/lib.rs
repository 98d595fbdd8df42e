//! Per-request JSON naming conventions.
//!
//! A client picks the key casing of a response with the
//! `x-json-naming-strategy` header (`camelCase`, `snake_case`, `kebab-case`
//! or `PascalCase`). The [`ContractResolver`] turns a type's static
//! [`TypeDescriptor`] into a [`SerializationContract`] for that convention,
//! caches it for the life of the process and drives conversion to and from
//! [`Value`] through it.
//!
//! Types opt in with `#[derive(Contract)]`:
//!
//! ```rust
//! use polycase_contract::prelude::*;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Contract)]
//! #[contract(skip_null = true)]
//! struct Invoice {
//!     invoice_id: u64,
//!     #[contract(rename = "Customer")]
//!     customer_name: String,
//!     note: Option<String>,
//! }
//!
//! let resolver = ContractResolver::new(ContractPolicies::default())
//!     .bind_selector(DynamicNamingSelector::new(Arc::new(ThreadScopedAccessor)))
//!     .bind_cache(Arc::new(MemoryContractCache::new()));
//!
//! let invoice = Invoice { invoice_id: 7, customer_name: "Ada".into(), note: None };
//! let json = resolver.to_value_as(&invoice, NamingConvention::SnakeCase)?;
//!
//! assert_eq!(json, serde_json::json!({ "invoice_id": 7, "customer": "Ada" }));
//! # Ok::<(), ContractError>(())
//! ```

extern crate self as polycase_contract;

mod cache;
mod contract;
mod engine;
mod error;
mod naming;
mod resolver;
mod selector;
mod value;

pub use cache::{CacheKey, ContractBuild, ContractCache, MemoryContractCache};
pub use contract::{
    ContractMember, ContractPolicies, DATE_ONLY_FORMAT, Describe, FieldDescriptor,
    PolicyOverrides, SerializationContract, TypeDescriptor, ValueTransform,
};
pub use engine::{ContractObject, DeserializeContext, MemberReader, SerializeContext};
pub use error::{ContractError, ContractErrorExt};
pub use naming::{CamelCase, KebabCase, NamingConvention, NamingStrategy, PascalCase, SnakeCase};
pub use polycase_derive::Contract;
pub use resolver::ContractResolver;
pub use selector::{
    DynamicNamingSelector, FixedHeadersAccessor, NAMING_HEADER, RequestContextAccessor,
    RequestHeaders, ThreadScopedAccessor, request_scope,
};
pub use serde_json::Value;
pub use value::ContractValue;

pub mod prelude {
    pub use crate::{
        Contract, ContractCache, ContractError, ContractPolicies, ContractResolver,
        ContractValue, DynamicNamingSelector, FixedHeadersAccessor, MemoryContractCache,
        NAMING_HEADER, NamingConvention, RequestContextAccessor, RequestHeaders,
        ThreadScopedAccessor, request_scope,
    };
}
