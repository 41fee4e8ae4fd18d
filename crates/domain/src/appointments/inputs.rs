use super::aggregate::{DetailsKind, PaymentMethod};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBookingInput {
    pub hospital_id: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentInput {
    pub method: PaymentMethod,
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitDetailsInput {
    #[serde(rename = "type")]
    pub kind: DetailsKind,
    pub content: String,
}
