use crate::cache::{CacheKey, ContractCache};
use crate::contract::{ContractPolicies, Describe, SerializationContract, TypeDescriptor};
use crate::engine::{DeserializeContext, SerializeContext};
use crate::error::ContractError;
use crate::naming::NamingConvention;
use crate::selector::DynamicNamingSelector;
use crate::value::ContractValue;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

const BIND_SELECTOR: &str = "ContractResolver::bind_selector";
const BIND_CACHE: &str = "ContractResolver::bind_cache";

/// Resolves the serialization contract of a type under a naming convention.
///
/// One resolver is shared by every request for the lifetime of the process.
/// It holds no per-request state: the convention is resolved once per
/// serialization pass and passed along as a value.
///
/// The selector and the cache are bound after construction, during startup
/// wiring. Using a resolver with either missing fails with
/// [`ContractError::Configuration`].
///
/// # Example
///
/// ```rust
/// use polycase_contract::prelude::*;
/// use std::sync::Arc;
///
/// #[derive(Debug, Contract)]
/// struct Person {
///     first_name: String,
/// }
///
/// let resolver = ContractResolver::new(ContractPolicies::default())
///     .bind_selector(DynamicNamingSelector::new(Arc::new(ThreadScopedAccessor)))
///     .bind_cache(Arc::new(MemoryContractCache::new()));
///
/// let headers = RequestHeaders::from_iter([(NAMING_HEADER, "kebab-case")]);
/// let json = request_scope(headers, || {
///     resolver.to_value(&Person { first_name: "Ada".to_owned() })
/// })?;
///
/// assert_eq!(json, serde_json::json!({ "first-name": "Ada" }));
/// # Ok::<(), ContractError>(())
/// ```
#[derive(Debug, Default)]
pub struct ContractResolver {
    selector: Option<DynamicNamingSelector>,
    cache: Option<Arc<dyn ContractCache>>,
    policies: ContractPolicies,
    builds: AtomicU64,
}

impl ContractResolver {
    /// Creates an unwired resolver with the host's default type policies.
    #[must_use]
    pub fn new(policies: ContractPolicies) -> Self {
        Self { selector: None, cache: None, policies, builds: AtomicU64::new(0) }
    }

    #[must_use]
    pub fn bind_selector(mut self, selector: DynamicNamingSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    #[must_use]
    pub fn bind_cache(mut self, cache: Arc<dyn ContractCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub const fn policies(&self) -> ContractPolicies {
        self.policies
    }

    /// Number of contracts built (cache misses that succeeded) so far.
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    /// The bound cache.
    ///
    /// # Errors
    /// [`ContractError::Configuration`] if no cache was bound.
    pub fn cache(&self) -> Result<&dyn ContractCache, ContractError> {
        self.cache.as_deref().ok_or_else(|| ContractError::missing_dependency("ContractCache", BIND_CACHE))
    }

    fn selector(&self) -> Result<&DynamicNamingSelector, ContractError> {
        self.selector
            .as_ref()
            .ok_or_else(|| ContractError::missing_dependency("DynamicNamingSelector", BIND_SELECTOR))
    }

    /// Asks the selector which convention the current request wants.
    ///
    /// # Errors
    /// [`ContractError::Configuration`] when unwired, or
    /// [`ContractError::NoRequestContext`] outside of a request.
    pub fn current_convention(&self) -> Result<NamingConvention, ContractError> {
        self.selector()?.resolve()
    }

    /// Returns the contract of `descriptor` under `convention`, building and
    /// caching it on first use.
    ///
    /// # Errors
    /// * [`ContractError::Configuration`] if the selector or cache is not bound.
    /// * Build errors ([`ContractError::DuplicateMember`], [`ContractError::InvalidMember`]).
    pub fn resolve_contract(
        &self,
        descriptor: &'static TypeDescriptor,
        convention: NamingConvention,
    ) -> Result<Arc<SerializationContract>, ContractError> {
        self.selector()?;
        let cache = self.cache()?;
        let key = CacheKey::new(convention, descriptor.type_name);

        cache.get_or_create(key, &|| {
            let contract = SerializationContract::build(descriptor, convention, self.policies)?;
            self.builds.fetch_add(1, Ordering::Relaxed);
            debug!(
                r#type = descriptor.type_name,
                convention = %convention,
                members = contract.len(),
                "Built serialization contract"
            );
            Ok(contract)
        })
    }

    /// [`resolve_contract`](Self::resolve_contract) for a described type.
    ///
    /// # Errors
    /// See [`resolve_contract`](Self::resolve_contract).
    pub fn contract_for<T: Describe>(
        &self,
        convention: NamingConvention,
    ) -> Result<Arc<SerializationContract>, ContractError> {
        self.resolve_contract(T::descriptor(), convention)
    }

    /// Converts `value` to JSON under the current request's convention.
    ///
    /// # Errors
    /// Wiring, ambient-context, build and value errors.
    pub fn to_value<T: ContractValue>(&self, value: &T) -> Result<Value, ContractError> {
        let convention = self.current_convention()?;
        self.to_value_as(value, convention)
    }

    /// Converts `value` to JSON under an explicit convention.
    ///
    /// # Errors
    /// Wiring, build and value errors.
    pub fn to_value_as<T: ContractValue>(
        &self,
        value: &T,
        convention: NamingConvention,
    ) -> Result<Value, ContractError> {
        let mut cx = SerializeContext::new(self, convention);
        Ok(value.write(&mut cx, None)?.unwrap_or(Value::Null))
    }

    /// Encodes `value` as JSON bytes under the current request's convention.
    ///
    /// # Errors
    /// See [`to_value`](Self::to_value).
    pub fn to_vec<T: ContractValue>(&self, value: &T) -> Result<Vec<u8>, ContractError> {
        let json = self.to_value(value)?;
        serde_json::to_vec(&json)
            .map_err(|e| ContractError::encoding(&e).in_member("response body"))
    }

    /// Reads `value` under the current request's convention.
    ///
    /// # Errors
    /// Wiring, ambient-context, build and input errors.
    pub fn from_value<T: ContractValue>(&self, value: &Value) -> Result<T, ContractError> {
        let convention = self.current_convention()?;
        self.from_value_as(value, convention)
    }

    /// Reads `value` under an explicit convention.
    ///
    /// # Errors
    /// Wiring, build and input errors.
    pub fn from_value_as<T: ContractValue>(
        &self,
        value: &Value,
        convention: NamingConvention,
    ) -> Result<T, ContractError> {
        let cx = DeserializeContext::new(self, convention);
        T::read(value, &cx, None)
    }
}
