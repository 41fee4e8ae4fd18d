use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::errors::Error;

use super::model::Digibook;

/// Columns a patient may edit one at a time. Identity columns, email,
/// consent flags and timestamps are not editable here.
pub const EDITABLE_FIELDS: &[&str] = &[
    "full_name",
    "date_of_birth",
    "gender",
    "phone_number",
    "home_address",
    "emergency_contact",
    "blood_type",
    "allergies_text",
    "existing_conditions",
    "medical_history",
    "current_medications_text",
    "primary_doctor",
    "preferred_hospital",
    "preferred_language",
    "preferred_department",
    "accessibility_needs",
    "insurance_provider",
    "insurance_policy_number",
    "insurance_contact_info",
];

pub fn is_editable(field: &str) -> bool {
    EDITABLE_FIELDS.contains(&field)
}

/// "home_address" -> "home address"
pub fn field_label(field: &str) -> String {
    field.replace('_', " ")
}

/// Returns a copy of `digibook` with `field` set to `value`.
///
/// The value has to deserialize into the field's type, so a string cannot be
/// written into `existing_conditions` and `full_name` cannot be nulled.
pub fn set_field(
    digibook: &Digibook,
    field: &str,
    value: Value,
    now: DateTime<Utc>,
) -> Result<Digibook, Error> {
    if !is_editable(field) {
        return Err(Error::validation("Invalid field specified for update."));
    }

    let mut record = match serde_json::to_value(digibook) {
        Ok(Value::Object(record)) => record,
        Ok(_) => return Err(Error::persistence("Digibook did not serialize to an object")),
        Err(e) => return Err(Error::persistence(e.to_string())),
    };

    record.insert(field.to_string(), value);
    record.insert(
        "updated_at".to_string(),
        serde_json::to_value(now).map_err(|e| Error::persistence(e.to_string()))?,
    );

    serde_json::from_value(Value::Object(record))
        .map_err(|e| Error::validation(format!("Invalid value for {}: {}", field_label(field), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn digibook() -> Digibook {
        Digibook {
            clerk_user_id: "user_1".to_string(),
            email: "ada@example.cm".to_string(),
            full_name: "Ada".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_fields_outside_allow_list() {
        for field in ["clerk_user_id", "email", "consent_share_records", "id", "updated_at"] {
            let err = set_field(&digibook(), field, json!("x"), Utc::now()).unwrap_err();
            assert_eq!(err, Error::validation("Invalid field specified for update."));
        }
    }

    #[test]
    fn sets_nested_field() {
        let updated = set_field(
            &digibook(),
            "emergency_contact",
            json!({ "name": "Bih", "phone": "+237677", "relationship": "Mother" }),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(updated.emergency_contact.unwrap().name, "Bih");
        assert_eq!(updated.clerk_user_id, "user_1");
    }

    #[test]
    fn rejects_value_of_wrong_shape() {
        let err = set_field(&digibook(), "existing_conditions", json!("asthma"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));

        let err = set_field(&digibook(), "full_name", Value::Null, Utc::now()).unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn label_replaces_underscores() {
        assert_eq!(field_label("insurance_policy_number"), "insurance policy number");
    }
}
