use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Next-of-kin and emergency contacts share this shape
#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Contact {
    pub name: String,
    pub phone: String,
    pub relationship: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct MedicalHistory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_visits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surgeries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_history: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct PrimaryDoctor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Account row, one per identity-provider user
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Profile {
    pub clerk_id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub onboarding_complete: bool,
    #[serde(default, rename = "isAdmin")]
    pub is_admin: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A patient's medical profile
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Digibook {
    pub clerk_user_id: String,
    pub email: String,

    // Personal
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub home_address: Option<String>,

    // Contacts
    #[serde(default)]
    pub next_of_kin: Option<Contact>,
    #[serde(default)]
    pub emergency_contact: Option<Contact>,

    // Medical
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies_text: Option<String>,
    #[serde(default)]
    pub existing_conditions: Option<Vec<String>>,
    #[serde(default)]
    pub medical_history: Option<MedicalHistory>,
    #[serde(default)]
    pub current_medications_text: Option<String>,

    // Preferences
    #[serde(default)]
    pub primary_doctor: Option<PrimaryDoctor>,
    #[serde(default)]
    pub preferred_hospital: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub preferred_department: Option<String>,
    #[serde(default)]
    pub accessibility_needs: Option<Vec<String>>,

    // Insurance
    #[serde(default)]
    pub insurance_provider: Option<String>,
    #[serde(default)]
    pub insurance_policy_number: Option<String>,
    #[serde(default)]
    pub insurance_contact_info: Option<String>,

    // Consent
    #[serde(default)]
    pub consent_share_records: bool,
    #[serde(default)]
    pub consent_notifications: bool,
    #[serde(default)]
    pub consent_emergency_access: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
