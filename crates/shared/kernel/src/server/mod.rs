//! HTTP plumbing shared by the server and the feature slices.

pub mod error;
pub mod health;
pub mod json;
pub mod router;
pub mod scope;
pub mod state;

pub use error::{ApiError, ApiErrorExt};
pub use json::{ContractBody, ContractJson};
pub use scope::{TaskLocalAccessor, current_resolver, request_scope, with_request_scope};
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
