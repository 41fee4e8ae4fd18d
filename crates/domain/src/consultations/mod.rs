//! Consultation digitization: capture, extraction, enrichment, review and
//! persistence.

/// Upload validation and data URLs
pub mod capture;

/// Lenient JSON recovery from model output
pub mod json;

pub mod model;

/// Model-call sequencing
pub mod pipeline;

pub mod prompts;

/// Patient message and persistence
pub mod review;

pub use capture::ImageData;
pub use model::{
    Consultation, ConsultationItem, ConsultationPayload, ConsultationRecord,
    EnrichedMedicationInfo, EnrichmentMap, FormattedRecord, ProcessedConsultation, RecordStatus,
};
pub use pipeline::{GenerationRequest, GenerativeModel, ModelNames, Pipeline, SpeechToText};
pub use review::{compose_patient_message, save_consultation, submit_review, PatientMessage, ReviewSubmission};
