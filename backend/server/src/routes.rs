use std::sync::Arc;

use axum::{Json, body::Bytes, extract, http::StatusCode, response::IntoResponse};
use catalog::{
    Category, Group, Location,
    marker::{Marker, MarkerType, build_markers},
    payloads::{Registration, ToggleResponse},
};
use tracing::info;

use crate::{
    auth::Caller,
    error::AppError,
    state::State,
    store::{Toggled, toggle},
    utils::{check_location, get_location_id, resolve_user},
};

pub async fn groups_handler(extract::State(state): extract::State<Arc<State>>) -> Json<Vec<Group>> {
    Json(state.catalog.groups().to_vec())
}

pub async fn categories_handler(
    extract::State(state): extract::State<Arc<State>>,
) -> Json<Vec<Category>> {
    Json(state.catalog.categories().to_vec())
}

pub async fn locations_handler(
    extract::State(state): extract::State<Arc<State>>,
) -> Json<Vec<Location>> {
    Json(state.catalog.locations().to_vec())
}

pub async fn marker_types_handler(
    extract::State(state): extract::State<Arc<State>>,
) -> Json<Vec<MarkerType>> {
    Json(state.marker_types.clone())
}

pub async fn completions_handler(
    extract::State(state): extract::State<Arc<State>>,
    caller: Caller,
) -> Result<Json<Vec<u32>>, AppError> {
    let user = resolve_user(&state, &caller).await?;
    let completed = state.store.completed_ids(user).await?;

    Ok(Json(completed.into_iter().collect()))
}

pub async fn markers_handler(
    extract::State(state): extract::State<Arc<State>>,
    caller: Caller,
) -> Result<Json<Vec<Marker>>, AppError> {
    let user = resolve_user(&state, &caller).await?;
    let completed = state.store.completed_ids(user).await?;

    Ok(Json(build_markers(state.catalog.locations(), &completed)))
}

pub async fn register_handler(
    extract::State(state): extract::State<Arc<State>>,
    caller: Caller,
) -> Result<impl IntoResponse, AppError> {
    let (user_id, created) = state.store.register_user(&caller.0).await?;

    let status = if created {
        info!("Registered user {user_id}");
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(Registration { user_id, created })))
}

pub async fn complete_handler(
    extract::State(state): extract::State<Arc<State>>,
    caller: Caller,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let user = resolve_user(&state, &caller).await?;
    let location_id = check_location(&state, get_location_id(&body)?)?;

    let toggled = toggle(state.store.as_ref(), user, location_id).await?;
    let marker = toggled.record();

    let (status, message) = match toggled {
        Toggled::Created(_) => (
            StatusCode::CREATED,
            "New marker created with completed: true".to_string(),
        ),
        Toggled::Updated(record) => (
            StatusCode::OK,
            format!("Marker updated to completed: {}", record.completed),
        ),
    };

    #[cfg(feature = "verbose")]
    info!("User {user} toggled location {location_id}: {}", marker.completed);

    Ok((status, Json(ToggleResponse { message, marker })))
}
