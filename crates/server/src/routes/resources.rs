//! Generic CRUD handlers shared by every marketplace collection.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use models::{EntityId, Page, Validate};

use crate::errors::ApiError;
use crate::startup::AppState;
use crate::store::{ListQuery, Record};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(v)| v).map_err(|rej| ApiError::bad_request(rej.body_text()))
}

pub async fn list<R: Record>(State(state): State<AppState>, Query(q): Query<ListQuery>) -> Json<Page<R>> {
    Json(state.store.list::<R>(&q).await)
}

pub async fn get_one<R: Record>(State(state): State<AppState>, Path(id): Path<EntityId>) -> Result<Json<R>, ApiError> {
    Ok(Json(state.store.get::<R>(&id).await?))
}

pub async fn create<R: Record>(
    State(state): State<AppState>,
    payload: Result<Json<R::Input>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R::Input: Validate,
{
    let record = state.store.create::<R>(body(payload)?).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    payload: Result<Json<R::Input>, JsonRejection>,
) -> Result<Json<R>, ApiError>
where
    R::Input: Validate,
{
    Ok(Json(state.store.update::<R>(&id, body(payload)?).await?))
}

pub async fn remove<R: Record>(State(state): State<AppState>, Path(id): Path<EntityId>) -> Result<StatusCode, ApiError> {
    state.store.delete::<R>(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `/<resource>` and `/<resource>/:id` for one record type.
pub fn resource_routes<R: Record>() -> Router<AppState>
where
    R::Input: Validate,
{
    let collection = format!("/{}", R::RESOURCE);
    let item = format!("/{}/:id", R::RESOURCE);
    Router::new()
        .route(&collection, get(list::<R>).post(create::<R>))
        .route(&item, get(get_one::<R>).put(update::<R>).delete(remove::<R>))
}
