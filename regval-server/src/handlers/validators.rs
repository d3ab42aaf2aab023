use axum::{
    extract::{Path, State},
    Json,
};

use crate::dto::ValidatorRead;
use crate::error::AppError;
use crate::AppState;

pub async fn list_validators(State(state): State<AppState>) -> Json<Vec<ValidatorRead>> {
    let validators = state
        .engine
        .registry()
        .list()
        .iter()
        .map(ValidatorRead::from)
        .collect();
    Json(validators)
}

pub async fn get_validator(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ValidatorRead>, AppError> {
    let validator = state.engine.registry().get(&key)?;
    Ok(Json(ValidatorRead::from(validator)))
}
