pub use crate::config::{ConfigError, load_config};
pub use crate::contracts::wire_contracts;
pub use crate::server::{
    ApiError, ApiErrorExt, ApiState, ApiStateBuilder, ContractBody, ContractJson,
    TaskLocalAccessor, request_scope,
};
pub use polycase_contract::prelude::*;
pub use polycase_domain::config::ApiConfig;
pub use polycase_domain::registry::{FeatureSlice, InitializedSlice};
