use axum::body::Bytes;
use catalog::payloads::{ToggleRequest, UserId};

use crate::{
    auth::Caller,
    error::AppError::{self, LocationNotFound, MalformedPayload, UserNotFound},
    state::State,
};

pub fn get_location_id(body: &Bytes) -> Result<i64, AppError> {
    let request: ToggleRequest = serde_json::from_slice(body).map_err(|_| MalformedPayload)?;

    Ok(request.location_id)
}

pub async fn resolve_user(state: &State, caller: &Caller) -> Result<UserId, AppError> {
    state.store.find_user(&caller.0).await?.ok_or(UserNotFound)
}

/// Unknown ids pass through when location validation is off. Ids outside `u32` never
/// name a location.
pub fn check_location(state: &State, location_id: i64) -> Result<u32, AppError> {
    let id = u32::try_from(location_id).map_err(|_| LocationNotFound(location_id))?;

    if state.config.validate_locations && state.catalog.location(id).is_none() {
        return Err(LocationNotFound(location_id));
    }

    Ok(id)
}
