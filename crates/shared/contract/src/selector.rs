//! Per-request naming convention selection.
//!
//! The selector never remembers a convention: every [`DynamicNamingSelector::resolve`]
//! call reads the ambient request headers through a [`RequestContextAccessor`]
//! and derives the answer again. Callers thread the returned value through
//! their own serialization pass.

use crate::error::ContractError;
use crate::naming::NamingConvention;
use fxhash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Request header carrying the desired key-casing convention.
pub const NAMING_HEADER: &str = "x-json-naming-strategy";

/// Immutable snapshot of a request's headers.
///
/// Names are stored lower-cased; only the first value seen for a name is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHeaders {
    values: FxHashMap<String, String>,
}

impl RequestHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a header value. Returns `false` if the name already had one.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> bool {
        let name = name.to_ascii_lowercase();
        if self.values.contains_key(&name) {
            return false;
        }
        self.values.insert(name, value.into());
        true
    }

    /// First value of the named header, matched case-insensitively.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(value) = self.values.get(name) {
            return Some(value);
        }
        self.values.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RequestHeaders
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.insert(name.as_ref(), value);
        }
        headers
    }
}

/// Supplies the headers of the request currently being served.
///
/// Implementations are provided by the hosting environment. Calling
/// [`current_headers`](Self::current_headers) with no request in flight is a
/// caller error and must fail with [`ContractError::NoRequestContext`].
pub trait RequestContextAccessor: Send + Sync + fmt::Debug {
    fn current_headers(&self) -> Result<Arc<RequestHeaders>, ContractError>;
}

thread_local! {
    static THREAD_SCOPE: RefCell<Option<Arc<RequestHeaders>>> = const { RefCell::new(None) };
}

/// Restores the enclosing scope when a [`request_scope`] ends, even on unwind.
struct ScopeGuard {
    previous: Option<Arc<RequestHeaders>>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        THREAD_SCOPE.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// Runs `f` with `headers` installed as the current thread's request context.
///
/// Scopes nest; the enclosing headers are visible again once `f` returns.
pub fn request_scope<R>(headers: impl Into<Arc<RequestHeaders>>, f: impl FnOnce() -> R) -> R {
    let headers = headers.into();
    let previous = THREAD_SCOPE.with(|slot| slot.borrow_mut().replace(headers));
    let _guard = ScopeGuard { previous };
    f()
}

/// Accessor for synchronous workers: reads the scope entered with [`request_scope`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScopedAccessor;

impl RequestContextAccessor for ThreadScopedAccessor {
    fn current_headers(&self) -> Result<Arc<RequestHeaders>, ContractError> {
        THREAD_SCOPE.with(|slot| slot.borrow().clone()).ok_or_else(|| {
            ContractError::NoRequestContext {
                message: "no request scope is active on this thread".into(),
                context: Some("wrap the call in `polycase_contract::request_scope`".into()),
            }
        })
    }
}

/// Accessor that always reports the same headers (background jobs, tests).
#[derive(Debug, Clone, Default)]
pub struct FixedHeadersAccessor {
    headers: Arc<RequestHeaders>,
}

impl FixedHeadersAccessor {
    #[must_use]
    pub fn new(headers: RequestHeaders) -> Self {
        Self { headers: Arc::new(headers) }
    }

    /// Pins the naming header to one convention.
    #[must_use]
    pub fn convention(convention: NamingConvention) -> Self {
        Self::new(RequestHeaders::from_iter([(NAMING_HEADER, convention.label())]))
    }
}

impl RequestContextAccessor for FixedHeadersAccessor {
    fn current_headers(&self) -> Result<Arc<RequestHeaders>, ContractError> {
        Ok(Arc::clone(&self.headers))
    }
}

/// Maps the naming header of the in-flight request to a [`NamingConvention`].
#[derive(Debug, Clone)]
pub struct DynamicNamingSelector {
    accessor: Arc<dyn RequestContextAccessor>,
}

impl DynamicNamingSelector {
    pub fn new(accessor: Arc<dyn RequestContextAccessor>) -> Self {
        Self { accessor }
    }

    /// Resolves the convention of the current request.
    ///
    /// # Errors
    /// Propagates [`ContractError::NoRequestContext`] from the accessor when
    /// no request is in flight.
    pub fn resolve(&self) -> Result<NamingConvention, ContractError> {
        let headers = self.accessor.current_headers()?;
        Ok(Self::convention_for(&headers))
    }

    /// Pure mapping from a header snapshot to a convention.
    #[must_use]
    pub fn convention_for(headers: &RequestHeaders) -> NamingConvention {
        Self::convention_from_value(headers.get(NAMING_HEADER))
    }

    /// Absent, blank or unrecognised values select the default convention.
    #[must_use]
    pub fn convention_from_value(value: Option<&str>) -> NamingConvention {
        let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return NamingConvention::default();
        };

        NamingConvention::from_label(raw).unwrap_or_else(|| {
            debug!(header = NAMING_HEADER, value = raw, "Unrecognised naming convention, using default");
            NamingConvention::default()
        })
    }
}
