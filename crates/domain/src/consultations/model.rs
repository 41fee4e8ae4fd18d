use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Models sometimes answer `null` where a string or list is expected
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedMedicationInfo {
    pub corrected_name: String,
    /// e.g. "1 tablet in the morning, 0 in the afternoon, 1 tablet in the evening."
    pub dosage_schedule: String,
    pub duration: String,
    pub advice: String,
}

/// Enrichment output, keyed by the drug string exactly as it was read
pub type EnrichmentMap = BTreeMap<String, EnrichedMedicationInfo>;

/// One row of the paper form. Several drugs in one cell become several items
/// sharing the row's lab work and results.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub lab_work: String,
    #[serde(default)]
    pub lab_results: Option<String>,
    #[serde(default)]
    pub drugs: Option<String>,
    #[serde(default)]
    pub fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_info: Option<EnrichedMedicationInfo>,
}

impl ConsultationItem {
    /// The drug string, if this row prescribes anything
    pub fn drug(&self) -> Option<&str> {
        self.drugs
            .as_deref()
            .map(str::trim)
            .filter(|drug| !drug.is_empty())
    }
}

/// What the model reads off a consultation paper
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedConsultation {
    #[serde(default)]
    pub patient_email: Option<String>,
    #[serde(default)]
    pub patient_phone_number: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub complaint: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consultation_items: Vec<ConsultationItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_notes: String,
}

impl ProcessedConsultation {
    /// Drug strings of items that still lack enrichment, deduplicated, in order
    pub fn unenriched_drugs(&self) -> Vec<String> {
        let mut drugs: Vec<String> = Vec::new();
        for item in &self.consultation_items {
            if item.enriched_info.is_some() {
                continue;
            }
            if let Some(drug) = item.drug() {
                if !drugs.iter().any(|d| d == drug) {
                    drugs.push(drug.to_string());
                }
            }
        }
        drugs
    }

    pub fn attach_enrichment(&mut self, enrichment: &EnrichmentMap) {
        for item in &mut self.consultation_items {
            if item.enriched_info.is_some() {
                continue;
            }
            let info = item.drug().and_then(|drug| enrichment.get(drug)).cloned();
            if info.is_some() {
                item.enriched_info = info;
            }
        }
    }

    /// Null fees count as zero
    pub fn total_fee(&self) -> f64 {
        total_fee(&self.consultation_items)
    }
}

pub fn total_fee(items: &[ConsultationItem]) -> f64 {
    items.iter().map(|item| item.fee.unwrap_or(0.0)).sum()
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PrescribedMedication {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub dosage: String,
    #[serde(default)]
    pub frequency: String,
}

/// Generic medical document summary
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FormattedRecord {
    pub patient_info: PatientInfo,
    #[serde(default)]
    pub diagnosis: String,
    pub medications: Vec<PrescribedMedication>,
    #[serde(default)]
    pub next_appointment: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Processing,
    Completed,
    Error,
}

/// An uploaded paper as the review screen tracks it
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationRecord {
    pub id: String,
    pub document_title: String,
    pub record_type: String,
    pub upload_date: DateTime<Utc>,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_data: Option<ProcessedConsultation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ConsultationRecord {
    pub fn new(record_type: &str, image_url: Option<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("REC-{}", now.timestamp_millis()),
            document_title: "Processing...".to_string(),
            record_type: record_type.to_string(),
            upload_date: now,
            status: RecordStatus::Processing,
            formatted_data: None,
            image_url,
            error_message: None,
        }
    }

    pub fn complete(&mut self, data: ProcessedConsultation) {
        self.document_title = format!(
            "Consultation by {}",
            data.doctor_name.as_deref().unwrap_or("Unknown")
        );
        self.status = RecordStatus::Completed;
        self.formatted_data = Some(data);
        self.error_message = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.document_title = "Processing Failed".to_string();
        self.status = RecordStatus::Error;
        self.error_message = Some(message.into());
    }
}

/// Flattened review result handed to the persistence action
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsultationPayload {
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub patient_email: Option<String>,
    #[serde(default)]
    pub patient_phone_number: Option<String>,
    #[serde(default)]
    pub complaint: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consultation_items: Vec<ConsultationItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary_notes: String,
    #[serde(default)]
    pub total_fee: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Persisted consultation row
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Consultation {
    pub id: String,
    pub user_id: String,
    pub doctor_name: Option<String>,
    pub patient_email: String,
    pub patient_phone_number: Option<String>,
    pub complaint: Option<String>,
    pub consultation_items: Vec<ConsultationItem>,
    pub summary_notes: String,
    pub total_fee: f64,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}
