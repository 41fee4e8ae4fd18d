use chrono::Utc;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::{
    errors::Error,
    store::{ImageStore, Repository},
};

use super::{
    capture::{is_data_url, ImageData},
    model::{total_fee, Consultation, ConsultationPayload, ConsultationRecord, ProcessedConsultation},
};

/// Draft of the message a patient receives once their consultation is saved
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientMessage {
    pub patient_email: String,
    pub email_body: String,
    pub total_fee: f64,
}

/// What the review screen sends when staff hit "send"
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    pub record: ConsultationRecord,
    #[serde(default)]
    pub patient_email: String,
    #[serde(default)]
    pub summary: String,
}

impl ReviewSubmission {
    /// Flattens the reviewed record into the persistence payload.
    pub fn to_payload(&self) -> Result<ConsultationPayload, Error> {
        let data = self
            .record
            .formatted_data
            .as_ref()
            .ok_or_else(|| Error::missing("Record has no processed data to submit."))?;

        Ok(ConsultationPayload {
            doctor_name: data.doctor_name.clone(),
            patient_email: Some(self.patient_email.clone()),
            patient_phone_number: data.patient_phone_number.clone(),
            complaint: data.complaint.clone(),
            consultation_items: data.consultation_items.clone(),
            summary_notes: self.summary.clone(),
            total_fee: total_fee(&data.consultation_items),
            image_url: self.record.image_url.clone(),
        })
    }
}

pub fn compose_patient_message(data: &ProcessedConsultation, summary: &str) -> PatientMessage {
    let doctor = data.doctor_name.as_deref().filter(|name| !name.is_empty());
    let total = total_fee(&data.consultation_items);

    let mut body = format!(
        "Dear Patient,\n\nPlease find the summary of your recent consultation with {}.\n\n\
         --- Consultation Summary ---\n{}\n\n--- Prescriptions & Advice ---\n",
        doctor.unwrap_or("our clinic"),
        summary
    );

    for info in data.consultation_items.iter().filter_map(|i| i.enriched_info.as_ref()) {
        body.push_str(&format!("* {}: {}\n", info.corrected_name, info.advice));
    }

    body.push_str("\n--- Billing Details ---\n");
    for item in &data.consultation_items {
        if let Some(fee) = item.fee.filter(|fee| *fee > 0.0) {
            body.push_str(&format!("- {}: {} XAF\n", item.lab_work, format_amount(fee)));
        }
    }

    body.push_str(&format!(
        "\nTotal Amount Due: {} XAF\n\nIf you have any questions, please do not hesitate to contact us.\n\nThank you,\n{}",
        format_amount(total),
        doctor.unwrap_or("The Clinic")
    ));

    PatientMessage {
        patient_email: data.patient_email.clone().unwrap_or_default(),
        email_body: body,
        total_fee: total,
    }
}

/// Thousands-separated amount, fractional part only when present.
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let rounded = (amount.abs() * 100.0).round() / 100.0;
    let whole = rounded.trunc() as u64;
    let cents = ((rounded - rounded.trunc()) * 100.0).round() as u64;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if cents > 0 {
        let fraction = format!("{:02}", cents);
        grouped.push('.');
        grouped.push_str(fraction.trim_end_matches('0'));
    }

    if negative {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Resolves the patient by email and inserts the consultation row.
///
/// Inline images are moved to the object store first so rows stay small.
/// Duplicate submissions are accepted.
pub async fn save_consultation(
    repo: &dyn Repository,
    images: &dyn ImageStore,
    payload: ConsultationPayload,
) -> Result<Consultation, Error> {
    let email = payload
        .patient_email
        .as_deref()
        .map(normalize_email)
        .filter(|email| !email.is_empty())
        .ok_or_else(|| Error::missing("Patient email is missing from the processed data."))?;

    let profile = repo.find_profile_by_email(&email).await?.ok_or_else(|| {
        Error::not_found(format!(
            "No patient profile found with the email \"{}\". Please ensure the patient is registered.",
            email
        ))
    })?;

    let id = Ulid::new().to_string();

    let image_url = match payload.image_url {
        Some(url) if is_data_url(&url) => {
            let image = ImageData::parse(&url)?;
            let key = format!("consultations/{}.{}", id, image.extension());
            Some(images.put_image(&key, &image.mime_type, image.decode()?).await?)
        }
        other => other,
    };

    let consultation = Consultation {
        id,
        user_id: profile.clerk_id,
        doctor_name: payload.doctor_name,
        patient_email: email,
        patient_phone_number: payload.patient_phone_number,
        complaint: payload.complaint,
        consultation_items: payload.consultation_items,
        summary_notes: payload.summary_notes,
        total_fee: payload.total_fee,
        image_url,
        created_at: Utc::now(),
    };

    repo.insert_consultation(consultation.clone())
        .await
        .map_err(|e| Error::persistence(format!("Failed to save consultation record: {}", e)))?;

    tracing::info!(
        "Saved consultation {} for user {}",
        consultation.id,
        consultation.user_id
    );
    Ok(consultation)
}

/// The send step: an empty patient email never reaches the store.
pub async fn submit_review(
    repo: &dyn Repository,
    images: &dyn ImageStore,
    submission: &ReviewSubmission,
) -> Result<Consultation, Error> {
    if submission.patient_email.trim().is_empty() {
        return Err(Error::missing("Patient email is required to send the consultation."));
    }

    save_consultation(repo, images, submission.to_payload()?).await
}
