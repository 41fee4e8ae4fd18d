//! Healthbook Domain Models

/// Appointment booking aggregate
pub mod appointments;

/// Consultation digitization pipeline
pub mod consultations;

/// Patient medical profiles
pub mod digibooks;

/// Domain errors
pub mod errors;

/// Hospital catalog
pub mod hospitals;

/// Persistence ports and adapters
pub mod store;

pub use errors::Error;
