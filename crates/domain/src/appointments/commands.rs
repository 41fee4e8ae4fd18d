use serde::{Deserialize, Serialize};
use super::aggregate::{DetailsKind, PaymentMethod};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub enum Command {
    /// Open the booking flow for a hospital
    StartBooking {
        id: String,
        user_id: String,
        hospital_id: u32,
        hospital_name: String,
    },

    /// Record the (stubbed) consultation fee payment
    ConfirmPayment {
        method: PaymentMethod,
        phone_number: String,
        reference: String,
    },

    /// Send the patient's description to the hospital
    SubmitDetails {
        kind: DetailsKind,
        content: String,
    },

    /// Dismiss the flow
    CloseBooking,
}
