use crate::model::Person;
use crate::store::PersonStore;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use polycase_kernel::server::{ApiError, ApiState, ContractBody, ContractJson};
use tracing::info;

fn store(state: &ApiState) -> Result<&PersonStore, ApiError> {
    Ok(state.try_get_slice::<PersonStore>()?)
}

/// `GET /` lists every person.
pub(crate) async fn list(
    State(state): State<ApiState>,
) -> Result<ContractJson<Vec<Person>>, ApiError> {
    Ok(ContractJson(store(&state)?.list()))
}

/// `GET /{id}`
pub(crate) async fn fetch(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> Result<ContractJson<Person>, ApiError> {
    store(&state)?
        .get(id)
        .map(ContractJson)
        .ok_or_else(|| ApiError::not_found(format!("person {id}")))
}

/// `POST /` stores a person and echoes it back with its assigned id.
pub(crate) async fn create(
    State(state): State<ApiState>,
    ContractBody(person): ContractBody<Person>,
) -> Result<(StatusCode, ContractJson<Person>), ApiError> {
    let created = store(&state)?.insert(person).map_err(|e| ApiError::from(e.to_string()))?;
    info!(id = created.id, "Person created");
    Ok((StatusCode::CREATED, ContractJson(created)))
}

/// `PUT /{id}`
pub(crate) async fn update(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
    ContractBody(person): ContractBody<Person>,
) -> Result<StatusCode, ApiError> {
    if store(&state)?.update(id, person) {
        info!(id, "Person updated");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("person {id}")))
    }
}

/// `DELETE /{id}`
pub(crate) async fn remove(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> Result<StatusCode, ApiError> {
    if store(&state)?.remove(id) {
        info!(id, "Person removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("person {id}")))
    }
}
