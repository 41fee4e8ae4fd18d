use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::model::{Contact, Digibook, MedicalHistory, PrimaryDoctor};

/// Flat onboarding form as submitted by the client
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DigibookForm {
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub home_address: Option<String>,

    pub next_of_kin_name: Option<String>,
    pub next_of_kin_relationship: Option<String>,
    pub next_of_kin_phone: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub emergency_contact_relationship: Option<String>,

    pub blood_type: Option<String>,
    pub allergies: Option<String>,
    /// Comma-separated
    pub existing_conditions: Option<String>,
    pub past_hospital_visits: Option<String>,
    pub surgeries: Option<String>,
    pub family_medical_history: Option<String>,
    pub current_medications: Option<String>,

    pub primary_doctor_name: Option<String>,
    pub primary_doctor_contact: Option<String>,
    pub preferred_hospital: Option<String>,
    pub preferred_language: Option<String>,
    pub preferred_department: Option<String>,
    /// Comma-separated
    pub accessibility_needs: Option<String>,

    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub insurance_contact_info: Option<String>,

    pub consent_share_records: Option<bool>,
    pub consent_notifications: Option<bool>,
    pub consent_emergency_access: Option<bool>,
}

/// Splits a comma-separated list, dropping blanks. A blank list is absent.
pub fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let raw = raw?;
    if raw.trim().is_empty() {
        return None;
    }
    Some(
        raw.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

fn contact(
    name: Option<&String>,
    phone: Option<&String>,
    relationship: Option<&String>,
) -> Option<Contact> {
    let name = non_empty(name);
    let phone = non_empty(phone);
    if name.is_none() && phone.is_none() {
        return None;
    }
    Some(Contact {
        name: name.unwrap_or_default(),
        phone: phone.unwrap_or_default(),
        relationship: non_empty(relationship).unwrap_or_default(),
    })
}

fn medical_history(
    past_visits: Option<&String>,
    surgeries: Option<&String>,
    family_history: Option<&String>,
) -> Option<MedicalHistory> {
    let history = MedicalHistory {
        past_visits: non_empty(past_visits),
        surgeries: non_empty(surgeries),
        family_history: non_empty(family_history),
    };
    if history == MedicalHistory::default() {
        return None;
    }
    Some(history)
}

fn primary_doctor(name: Option<&String>, contact: Option<&String>) -> Option<PrimaryDoctor> {
    let doctor = PrimaryDoctor {
        name: non_empty(name),
        contact: non_empty(contact),
    };
    if doctor == PrimaryDoctor::default() {
        return None;
    }
    Some(doctor)
}

/// Parts are name, phone, relationship. Untouched when the form carries none.
fn merge_contact(current: Option<Contact>, parts: [&Option<String>; 3]) -> Option<Contact> {
    if parts.iter().all(|part| part.is_none()) {
        return current;
    }
    let current = current.unwrap_or_default();
    let [name, phone, relationship] = parts;
    contact(
        name.as_ref().or(Some(&current.name)),
        phone.as_ref().or(Some(&current.phone)),
        relationship.as_ref().or(Some(&current.relationship)),
    )
}

impl DigibookForm {
    pub fn trimmed_full_name(&self) -> Option<String> {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }

    fn next_of_kin(&self) -> Option<Contact> {
        contact(
            self.next_of_kin_name.as_ref(),
            self.next_of_kin_phone.as_ref(),
            self.next_of_kin_relationship.as_ref(),
        )
    }

    fn emergency_contact(&self) -> Option<Contact> {
        contact(
            self.emergency_contact_name.as_ref(),
            self.emergency_contact_phone.as_ref(),
            self.emergency_contact_relationship.as_ref(),
        )
    }

    fn medical_history(&self) -> Option<MedicalHistory> {
        medical_history(
            self.past_hospital_visits.as_ref(),
            self.surgeries.as_ref(),
            self.family_medical_history.as_ref(),
        )
    }

    fn primary_doctor(&self) -> Option<PrimaryDoctor> {
        primary_doctor(
            self.primary_doctor_name.as_ref(),
            self.primary_doctor_contact.as_ref(),
        )
    }

    /// Builds a complete record from an onboarding submission.
    pub fn to_digibook(
        &self,
        user_id: &str,
        email: &str,
        full_name: String,
        now: DateTime<Utc>,
    ) -> Digibook {
        Digibook {
            clerk_user_id: user_id.to_string(),
            email: email.to_string(),
            full_name,
            date_of_birth: non_empty(self.date_of_birth.as_ref()),
            gender: non_empty(self.gender.as_ref()),
            phone_number: non_empty(self.phone_number.as_ref()),
            home_address: non_empty(self.home_address.as_ref()),
            next_of_kin: self.next_of_kin(),
            emergency_contact: self.emergency_contact(),
            blood_type: non_empty(self.blood_type.as_ref()),
            allergies_text: non_empty(self.allergies.as_ref()),
            existing_conditions: split_list(self.existing_conditions.as_deref()),
            medical_history: self.medical_history(),
            current_medications_text: non_empty(self.current_medications.as_ref()),
            primary_doctor: self.primary_doctor(),
            preferred_hospital: non_empty(self.preferred_hospital.as_ref()),
            preferred_language: non_empty(self.preferred_language.as_ref()),
            preferred_department: non_empty(self.preferred_department.as_ref()),
            accessibility_needs: split_list(self.accessibility_needs.as_deref()),
            insurance_provider: non_empty(self.insurance_provider.as_ref()),
            insurance_policy_number: non_empty(self.insurance_policy_number.as_ref()),
            insurance_contact_info: non_empty(self.insurance_contact_info.as_ref()),
            consent_share_records: self.consent_share_records.unwrap_or(false),
            consent_notifications: self.consent_notifications.unwrap_or(false),
            consent_emergency_access: self.consent_emergency_access.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites only the fields the form carries. Composite fields merge the
    /// parts present over the stored ones and are cleared once every part is blank.
    pub fn apply_to(&self, digibook: &mut Digibook, now: DateTime<Utc>) {
        fn set(target: &mut Option<String>, value: &Option<String>) {
            if let Some(value) = value {
                *target = Some(value.clone()).filter(|v| !v.is_empty());
            }
        }

        if let Some(full_name) = self.trimmed_full_name() {
            digibook.full_name = full_name;
        }
        set(&mut digibook.date_of_birth, &self.date_of_birth);
        set(&mut digibook.gender, &self.gender);
        set(&mut digibook.phone_number, &self.phone_number);
        set(&mut digibook.home_address, &self.home_address);

        digibook.next_of_kin = merge_contact(
            digibook.next_of_kin.take(),
            [
                &self.next_of_kin_name,
                &self.next_of_kin_phone,
                &self.next_of_kin_relationship,
            ],
        );
        digibook.emergency_contact = merge_contact(
            digibook.emergency_contact.take(),
            [
                &self.emergency_contact_name,
                &self.emergency_contact_phone,
                &self.emergency_contact_relationship,
            ],
        );

        set(&mut digibook.blood_type, &self.blood_type);
        set(&mut digibook.allergies_text, &self.allergies);
        if self.existing_conditions.is_some() {
            digibook.existing_conditions = split_list(self.existing_conditions.as_deref());
        }
        if [
            &self.past_hospital_visits,
            &self.surgeries,
            &self.family_medical_history,
        ]
        .iter()
        .any(|part| part.is_some())
        {
            let current = digibook.medical_history.take().unwrap_or_default();
            digibook.medical_history = medical_history(
                self.past_hospital_visits.as_ref().or(current.past_visits.as_ref()),
                self.surgeries.as_ref().or(current.surgeries.as_ref()),
                self.family_medical_history.as_ref().or(current.family_history.as_ref()),
            );
        }
        set(&mut digibook.current_medications_text, &self.current_medications);

        if self.primary_doctor_name.is_some() || self.primary_doctor_contact.is_some() {
            let current = digibook.primary_doctor.take().unwrap_or_default();
            digibook.primary_doctor = primary_doctor(
                self.primary_doctor_name.as_ref().or(current.name.as_ref()),
                self.primary_doctor_contact.as_ref().or(current.contact.as_ref()),
            );
        }
        set(&mut digibook.preferred_hospital, &self.preferred_hospital);
        set(&mut digibook.preferred_language, &self.preferred_language);
        set(&mut digibook.preferred_department, &self.preferred_department);
        if self.accessibility_needs.is_some() {
            digibook.accessibility_needs = split_list(self.accessibility_needs.as_deref());
        }

        set(&mut digibook.insurance_provider, &self.insurance_provider);
        set(&mut digibook.insurance_policy_number, &self.insurance_policy_number);
        set(&mut digibook.insurance_contact_info, &self.insurance_contact_info);

        if let Some(consent) = self.consent_share_records {
            digibook.consent_share_records = consent;
        }
        if let Some(consent) = self.consent_notifications {
            digibook.consent_notifications = consent;
        }
        if let Some(consent) = self.consent_emergency_access {
            digibook.consent_emergency_access = consent;
        }

        digibook.updated_at = now;
    }
}
