//! Digibook onboarding and edits.

/// Single-field edits
pub mod fields;

/// Onboarding form
pub mod form;

/// Records
pub mod model;

use chrono::Utc;
use serde_json::Value;

use crate::{errors::Error, store::Repository};

pub use fields::{field_label, EDITABLE_FIELDS};
pub use form::DigibookForm;
pub use model::{Contact, Digibook, MedicalHistory, PrimaryDoctor, Profile};

/// Upserts the profile (marking onboarding complete) and then the digibook.
pub async fn save_onboarding(
    repo: &dyn Repository,
    user_id: &str,
    email: Option<&str>,
    form: &DigibookForm,
) -> Result<Digibook, Error> {
    let email = email
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| Error::missing("No email address found for user account."))?;

    let full_name = form
        .trimmed_full_name()
        .ok_or_else(|| Error::missing("Full name is required."))?;

    let now = Utc::now();

    let existing_profile = repo.load_profile(user_id).await?;
    let profile = Profile {
        clerk_id: user_id.to_string(),
        email: email.to_string(),
        full_name: Some(full_name.clone()),
        onboarding_complete: true,
        is_admin: existing_profile.as_ref().and_then(|p| p.is_admin),
        created_at: existing_profile.as_ref().map_or(now, |p| p.created_at),
        updated_at: now,
    };
    repo.upsert_profile(profile)
        .await
        .map_err(|e| Error::persistence(format!("Failed to save profile: {}", e)))?;

    let mut digibook = form.to_digibook(user_id, email, full_name, now);
    if let Some(existing) = repo.load_digibook(user_id).await? {
        digibook.created_at = existing.created_at;
    }
    repo.save_digibook(digibook.clone())
        .await
        .map_err(|e| Error::persistence(format!("Failed to save health record: {}", e)))?;

    tracing::info!("Saved digibook for user {}", user_id);
    Ok(digibook)
}

pub async fn load(repo: &dyn Repository, user_id: &str) -> Result<Option<Digibook>, Error> {
    repo.load_digibook(user_id).await
}

/// Applies a full-form edit to an existing digibook.
pub async fn update(
    repo: &dyn Repository,
    user_id: &str,
    form: &DigibookForm,
) -> Result<Digibook, Error> {
    let mut digibook = repo
        .load_digibook(user_id)
        .await?
        .ok_or_else(|| Error::not_found("Health record not found"))?;

    form.apply_to(&mut digibook, Utc::now());
    repo.save_digibook(digibook.clone()).await?;

    Ok(digibook)
}

/// Edits one allow-listed field and returns the confirmation message.
pub async fn update_field(
    repo: &dyn Repository,
    user_id: &str,
    field: &str,
    value: Value,
) -> Result<String, Error> {
    if !fields::is_editable(field) {
        return Err(Error::validation("Invalid field specified for update."));
    }

    let digibook = repo
        .load_digibook(user_id)
        .await?
        .ok_or_else(|| Error::not_found("Health record not found"))?;

    let digibook = fields::set_field(&digibook, field, value, Utc::now())?;
    repo.save_digibook(digibook).await?;

    Ok(format!("{} updated successfully.", field_label(field)))
}
