use chrono::{DateTime, Utc};
use cqrs_es::DomainEvent;
use serde::{Deserialize, Serialize};
use super::aggregate::{ConsultationDetails, Payment};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "type")]
pub enum Event {
    BookingStarted {
        id: String,
        user_id: String,
        hospital_id: u32,
        hospital_name: String,
        fee: u32,
        created_at: DateTime<Utc>,
    },

    PaymentConfirmed {
        id: String,
        payment: Payment,
        updated_at: DateTime<Utc>,
    },

    DetailsSubmitted {
        id: String,
        details: ConsultationDetails,
        updated_at: DateTime<Utc>,
    },

    BookingClosed {
        id: String,
        updated_at: DateTime<Utc>,
    },
}

impl DomainEvent for Event {
    fn event_type(&self) -> String {
        match self {
            Event::BookingStarted { .. } => "Appointment:Started".to_string(),
            Event::PaymentConfirmed { .. } => "Appointment:PaymentConfirmed".to_string(),
            Event::DetailsSubmitted { .. } => "Appointment:DetailsSubmitted".to_string(),
            Event::BookingClosed { .. } => "Appointment:Closed".to_string(),
        }
    }

    fn event_version(&self) -> String {
        "1.0".to_string()
    }
}
