use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cqrs_es::Aggregate;
use serde::{Deserialize, Serialize};

use crate::errors::Error;

use super::{Command, Event};

/// Flat consultation fee charged at booking time, in XAF
pub const CONSULTATION_FEE: u32 = 5000;

/// Booking workflow status
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Booking started, waiting for the consultation fee
    #[default]
    Payment,
    /// Fee paid, waiting for the patient's description
    Details,
    /// Details sent to the hospital
    Success,
    /// Flow dismissed by the patient
    Closed,
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Payment => "payment",
            Self::Details => "details",
            Self::Success => "success",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    MobileMoney,
    OrangeMoney,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Payment {
    pub method: PaymentMethod,
    pub phone_number: String,
    pub amount: u32,
    pub reference: String,
}

/// How the patient described their symptoms
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum DetailsKind {
    Text,
    /// Dictated, then transcribed and translated server-side
    Voice,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct ConsultationDetails {
    pub kind: DetailsKind,
    pub content: String,
}

/// Appointment aggregate
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: AppointmentStatus,

    pub user_id: String,
    pub hospital_id: u32,
    pub hospital_name: String,
    pub fee: u32,

    pub payment: Option<Payment>,
    pub details: Option<ConsultationDetails>,
}

pub const AGGREGATE_TYPE: &str = "Appointment";

#[derive(Clone, Default)]
pub struct Services {}

#[async_trait]
impl Aggregate for Appointment {
    type Command = Command;
    type Event = Event;
    type Error = Error;
    type Services = Services;

    fn aggregate_type() -> String {
        AGGREGATE_TYPE.to_string()
    }

    async fn handle(
        &self,
        command: Self::Command,
        _services: &Self::Services,
    ) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            Command::StartBooking {
                id,
                user_id,
                hospital_id,
                hospital_name,
            } => {
                self.validate_new()?;

                Ok(vec![Event::BookingStarted {
                    id,
                    user_id,
                    hospital_id,
                    hospital_name,
                    fee: CONSULTATION_FEE,
                    created_at: Utc::now(),
                }])
            }

            Command::ConfirmPayment {
                method,
                phone_number,
                reference,
            } => {
                self.validate_existing()?;
                self.validate_stage(AppointmentStatus::Payment, AppointmentStatus::Details)?;

                let phone_number = phone_number.trim().to_string();
                if phone_number.is_empty() {
                    return Err(Error::validation("Please enter your phone number"));
                }

                Ok(vec![Event::PaymentConfirmed {
                    id: self.id.clone(),
                    payment: Payment {
                        method,
                        phone_number,
                        amount: self.fee,
                        reference,
                    },
                    updated_at: Utc::now(),
                }])
            }

            Command::SubmitDetails { kind, content } => {
                self.validate_existing()?;
                self.validate_stage(AppointmentStatus::Details, AppointmentStatus::Success)?;

                let content = content.trim().to_string();
                if content.is_empty() {
                    return Err(Error::validation(
                        "Please describe your symptoms before sending",
                    ));
                }

                Ok(vec![Event::DetailsSubmitted {
                    id: self.id.clone(),
                    details: ConsultationDetails { kind, content },
                    updated_at: Utc::now(),
                }])
            }

            Command::CloseBooking => {
                self.validate_existing()?;

                Ok(vec![Event::BookingClosed {
                    id: self.id.clone(),
                    updated_at: Utc::now(),
                }])
            }
        }
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            Event::BookingStarted {
                id,
                user_id,
                hospital_id,
                hospital_name,
                fee,
                created_at,
            } => {
                self.id = id;
                self.user_id = user_id;
                self.hospital_id = hospital_id;
                self.hospital_name = hospital_name;
                self.fee = fee;
                self.created_at = created_at;
                self.updated_at = created_at;
                self.status = AppointmentStatus::Payment;
            }

            Event::PaymentConfirmed { payment, updated_at, .. } => {
                self.payment = Some(payment);
                self.status = AppointmentStatus::Details;
                self.updated_at = updated_at;
            }

            Event::DetailsSubmitted { details, updated_at, .. } => {
                self.details = Some(details);
                self.status = AppointmentStatus::Success;
                self.updated_at = updated_at;
            }

            Event::BookingClosed { updated_at, .. } => {
                self.status = AppointmentStatus::Closed;
                self.updated_at = updated_at;
            }
        }
    }
}

impl Appointment {
    fn validate_new(&self) -> Result<(), Error> {
        if !self.id.is_empty() {
            return Err(Error::Uniqueness { field: "id".to_string() });
        }
        Ok(())
    }

    fn validate_existing(&self) -> Result<(), Error> {
        if self.id.is_empty() {
            return Err(Error::NotFound { entity: AGGREGATE_TYPE.to_string() });
        }
        if self.status == AppointmentStatus::Closed {
            return Err(Error::Forbidden);
        }
        Ok(())
    }

    /// The flow is strictly linear: each command is only valid in one stage.
    fn validate_stage(
        &self,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<(), Error> {
        if self.status != expected {
            return Err(Error::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }
}
