use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use domain::{
    appointments::{
        inputs::{ConfirmPaymentInput, StartBookingInput, SubmitDetailsInput},
        Command, View,
    },
    hospitals, Error,
};
use ulid::Ulid;

use crate::{
    auth::AuthUser,
    error::{ActionError, Success},
    extract::ActionJson,
    state::AppState,
};

fn metadata(user: &AuthUser) -> HashMap<String, String> {
    HashMap::from([
        ("command_id".to_string(), Ulid::new().to_string()),
        ("user_id".to_string(), user.user_id.clone()),
    ])
}

/// Loads the booking, hiding other patients' bookings as not found.
async fn owned_view(state: &AppState, id: &str, user: &AuthUser) -> Result<View, ActionError> {
    state
        .appointments_repo
        .load(id)
        .await
        .map_err(|e| Error::persistence(e.to_string()))?
        .filter(|view| view.appointment.user_id == user.user_id)
        .ok_or_else(|| Error::not_found("Appointment not found").into())
}

async fn execute(
    state: &AppState,
    id: &str,
    user: &AuthUser,
    command: Command,
) -> Result<Json<Success<View>>, ActionError> {
    owned_view(state, id, user).await?;
    state
        .appointments
        .execute(id, command, metadata(user))
        .await?;

    Ok(Success::data(owned_view(state, id, user).await?))
}

pub async fn start_booking(
    user: AuthUser,
    State(state): State<AppState>,
    ActionJson(input): ActionJson<StartBookingInput>,
) -> Result<(StatusCode, Json<Success<View>>), ActionError> {
    let hospital = hospitals::find(input.hospital_id)
        .ok_or_else(|| Error::not_found("Hospital not found"))?;

    let id = Ulid::new().to_string();
    let command = Command::StartBooking {
        id: id.clone(),
        user_id: user.user_id.clone(),
        hospital_id: hospital.id,
        hospital_name: hospital.name.clone(),
    };

    state
        .appointments
        .execute(&id, command, metadata(&user))
        .await?;

    tracing::info!("Booking {} started at {}", id, hospital.name);

    let view = owned_view(&state, &id, &user).await?;
    Ok((StatusCode::CREATED, Success::data(view)))
}

pub async fn get_appointment(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Success<View>>, ActionError> {
    Ok(Success::data(owned_view(&state, &id, &user).await?))
}

pub async fn confirm_payment(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    ActionJson(input): ActionJson<ConfirmPaymentInput>,
) -> Result<Json<Success<View>>, ActionError> {
    let command = Command::ConfirmPayment {
        method: input.method,
        phone_number: input.phone_number,
        reference: format!("PAY-{}", Ulid::new()),
    };
    execute(&state, &id, &user, command).await
}

pub async fn submit_details(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
    ActionJson(input): ActionJson<SubmitDetailsInput>,
) -> Result<Json<Success<View>>, ActionError> {
    let command = Command::SubmitDetails {
        kind: input.kind,
        content: input.content,
    };
    execute(&state, &id, &user, command).await
}

pub async fn close_booking(
    user: AuthUser,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Success<View>>, ActionError> {
    execute(&state, &id, &user, Command::CloseBooking).await
}
