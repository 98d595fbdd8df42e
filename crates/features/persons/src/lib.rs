//! Persons feature slice.
//!
//! Serves a small in-memory directory of people whose JSON keys follow the
//! casing each request asks for through the `x-json-naming-strategy` header.
mod error;
mod handlers;
pub mod model;
pub mod store;

pub use error::{PersonsError, PersonsErrorExt};
pub use model::Person;
pub use store::PersonStore;

use axum::Router;
use axum::routing::get;
use polycase_kernel::domain::registry::InitializedSlice;
use polycase_kernel::server::ApiState;

/// Mount point of [`router`].
pub const ROUTE_PREFIX: &str = "/api/v1/persons";

/// Initialize the persons feature with its mock data.
///
/// # Errors
/// Returns an error if the seed data is invalid.
pub fn init() -> Result<InitializedSlice, PersonsError> {
    let store = PersonStore::seeded()?;
    tracing::info!(people = store.list().len(), "Persons slice initialized");
    Ok(InitializedSlice::new(store))
}

/// Persons routes, relative to [`ROUTE_PREFIX`].
pub fn router() -> Router<ApiState> {
    Router::new()
        .route("/", get(handlers::list).post(handlers::create))
        .route("/{id}", get(handlers::fetch).put(handlers::update).delete(handlers::remove))
}
