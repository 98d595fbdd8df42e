use crate::contracts::wire_contracts;
use axum::extract::FromRef;
use fxhash::FxHashMap;
use polycase_contract::ContractResolver;
use polycase_domain::config::ApiConfig;
use polycase_domain::registry::{FeatureSlice, InitializedSlice};
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[polycase_derive::polycase_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub contracts: Arc<ContractResolver>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner.slices.get(&TypeId::of::<T>()).and_then(InitializedSlice::downcast_ref::<T>)
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, ApiStateError> {
        self.get_slice::<T>().ok_or_else(|| ApiStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Names of the registered slices (for diagnostics).
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.slices.values().map(|slice| slice.name)
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Arc<ContractResolver> {
    fn from_ref(state: &ApiState) -> Self {
        Arc::clone(&state.inner.contracts)
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    contracts: Option<Arc<ContractResolver>>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Uses an already wired resolver instead of wiring one from the config.
    #[must_use]
    pub fn contracts(mut self, resolver: Arc<ContractResolver>) -> Self {
        self.contracts = Some(resolver);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// Registers multiple slices at once.
    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        for slice in slices {
            self.slices.insert(slice.id, slice);
        }
        self
    }

    /// # Errors
    /// Returns an error if no [`ApiConfig`] was provided.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.ok_or_else(|| ApiStateError::Validation {
            message: "ApiConfig not provided".into(),
            context: None,
        })?;
        let contracts = self.contracts.unwrap_or_else(|| wire_contracts(&config.contracts));

        Ok(ApiState { inner: Arc::new(ApiStateInner { config, contracts, slices: self.slices }) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct Counter(u32);

    impl FeatureSlice for Counter {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn config_is_required() {
        let err = ApiState::builder().build().unwrap_err();
        assert!(matches!(err, ApiStateError::Validation { .. }));
    }

    #[test]
    fn slices_are_found_by_type() {
        let state = ApiState::builder()
            .config(ApiConfig::default())
            .register_slice(InitializedSlice::new(Counter(3)))
            .build()
            .unwrap();

        assert_eq!(state.get_slice::<Counter>().map(|c| c.0), Some(3));
        assert_eq!(state.slice_names().count(), 1);
        assert!(state.contracts.cache().is_ok());
    }

    #[test]
    fn missing_slices_are_reported() {
        #[derive(Debug)]
        struct Absent;
        impl FeatureSlice for Absent {
            fn as_any(&self) -> &dyn Any {
                self
            }
        }

        let state = ApiState::builder().config(ApiConfig::default()).build().unwrap();
        let err = state.try_get_slice::<Absent>().unwrap_err();
        assert!(err.to_string().contains("Absent"));
    }
}
