use axum::{extract::State, Json};
use domain::digibooks::{self, Digibook, DigibookForm};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    auth::AuthUser,
    error::{ActionError, Success},
    extract::ActionJson,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    field: String,
    #[serde(default)]
    value: Value,
}

pub async fn save_onboarding(
    user: AuthUser,
    State(state): State<AppState>,
    ActionJson(form): ActionJson<DigibookForm>,
) -> Result<Json<Success<Value>>, ActionError> {
    digibooks::save_onboarding(state.repo.as_ref(), &user.user_id, user.email.as_deref(), &form)
        .await?;

    Ok(Success::data(json!({
        "message": "Health record saved successfully!",
        "userId": user.user_id,
    })))
}

pub async fn get_digibook(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Success<Option<Digibook>>>, ActionError> {
    let digibook = digibooks::load(state.repo.as_ref(), &user.user_id).await?;
    Ok(Success::data(digibook))
}

pub async fn update_digibook(
    user: AuthUser,
    State(state): State<AppState>,
    ActionJson(form): ActionJson<DigibookForm>,
) -> Result<Json<Success<Digibook>>, ActionError> {
    let digibook = digibooks::update(state.repo.as_ref(), &user.user_id, &form).await?;
    Ok(Success::with_message("Health record updated successfully!", digibook))
}

pub async fn update_field(
    user: AuthUser,
    State(state): State<AppState>,
    ActionJson(update): ActionJson<FieldUpdate>,
) -> Result<Json<Success<()>>, ActionError> {
    let message =
        digibooks::update_field(state.repo.as_ref(), &user.user_id, &update.field, update.value)
            .await?;
    Ok(Success::message(message))
}
