//! Prompt text sent to the hosted model.

pub const OCR: &str = "You are an optical character recognition specialist. Extract all text \
from this image of a medical document. Keep the original structure, line breaks and layout as \
closely as possible. Return only the extracted text. If the image contains no text, return \
\"No text detected in the image.\"";

const CONSULTATION_EXAMPLE: &str = r#"{
  "patientEmail": "tonyuynudegita@gmail.com",
  "patientPhoneNumber": "+257672792565",
  "doctorName": "Tonyuy Ortu",
  "complaint": "Patient complains of high fever and painful stomach in the epigastric region.",
  "consultationItems": [
    { "labWork": "Test", "labResults": "BP=120/80mmhg, P=103blm, T=38.9, weight=70kg", "drugs": null, "fee": 0, "enrichedInfo": null },
    {
      "labWork": "Checking against Malaria",
      "labResults": "Positive widal S70120 Ca21, positive MP",
      "drugs": "Combret 80/480x 3days 1-0-1",
      "fee": 2000,
      "enrichedInfo": {
        "correctedName": "Coartem (Artemether/Lumefantrine) 80/480mg",
        "dosageSchedule": "1 tablet in the morning, 0 in the afternoon, 1 tablet in the evening.",
        "duration": "For 3 days.",
        "advice": "Take with a high-fat meal or drink (like milk) to help absorption. Finish the entire course even if you feel better."
      }
    },
    {
      "labWork": "Checking against Malaria",
      "labResults": "Positive widal S70120 Ca21, positive MP",
      "drugs": "Efferlgan 2-0-2 x 5day",
      "fee": null,
      "enrichedInfo": {
        "correctedName": "Efferalgan (Paracetamol)",
        "dosageSchedule": "2 tablets in the morning, 0 in the afternoon, 2 tablets in the evening.",
        "duration": "For 5 days.",
        "advice": "Dissolve tablets in a full glass of water before drinking. Can be taken with or without food."
      }
    }
  ],
  "summaryNotes": "The patient presented with high fever and epigastric pain. Vital signs show an elevated temperature and pulse. Lab results are positive for Widal and malaria parasites. Coartem for malaria and Efferalgan for fever have been prescribed."
}"#;

/// Image of a handwritten consultation paper -> ProcessedConsultation JSON
pub fn process_consultation() -> String {
    format!(
        r#"You are a meticulous data-entry assistant. Convert the attached image of a handwritten doctor's consultation paper into one JSON object.

RULES
1. Never invent data. For "patientEmail", "patientPhoneNumber" and "doctorName" copy the exact text on the paper. If a value is missing, crossed out or unreadable, use null.
2. Respond with a single valid JSON object and nothing else: no prose, no apologies, no markdown fences.

STEPS
1. Header: read the "Phone", "Email", "Doctor" and "Complain" fields exactly as written.
2. Table: the table has the columns "Lab Work", "Lab Result", "Drugs" and "Fee (XAF)". Create one entry in "consultationItems" per test or medication. When a cell lists several drugs, create one entry per drug and repeat that row's "labWork" and "labResults".
3. Fees: numbers only. "Free" or empty becomes 0 or null.
4. For each drug entry add "enrichedInfo" with "correctedName" (proper drug name, e.g. "Combret" -> "Coartem", "Efferlgan" -> "Efferalgan"), "dosageSchedule", "duration" and "advice" in patient-friendly words derived from the shorthand (e.g. "1-0-1", "x 3days"). Non-drug entries use null.
5. "summaryNotes": a professional summary based only on the complaint and the lab results.
6. Before answering, check that patientEmail, patientPhoneNumber and doctorName match the paper exactly.

EXAMPLE OUTPUT
{CONSULTATION_EXAMPLE}"#
    )
}

/// OCR'd consultation text -> ProcessedConsultation JSON
pub fn structure_consultation(text: &str) -> String {
    format!(
        r#"You are a medical data analyst. Structure the following raw text from a doctor's consultation paper into one JSON object.

Respond with ONLY the JSON object. No explanations and no markdown fences.

RULES
1. Header: find the patient's phone, email, the doctor's name and the "Complain" text.
2. Table: columns are "Lab Work", "Lab Result", "Drugs" and "Fee (XAF)". The first row holds vital signs under "Test". When a cell lists several drugs, create one item per drug and repeat the row's "labWork" and "labResults".
3. Fees: numbers only. "Free" or empty becomes 0 or null.
4. "summaryNotes": a professional summary.
5. Leave "enrichedInfo" out.

EXAMPLE OUTPUT
{CONSULTATION_EXAMPLE}

TEXT TO PROCESS
---
{text}
---"#
    )
}

const ENRICHMENT_EXAMPLE: &str = r#"{
  "Combret 80/480x 3days 1-0-1": {
    "correctedName": "Coartem (Artemether/Lumefantrine) 80/480mg",
    "dosageSchedule": "1 tablet in the morning, 0 in the afternoon, 1 tablet in the evening.",
    "duration": "For 3 days.",
    "advice": "Take with a high-fat meal or drink (like milk). Do not crush the tablets. Finish the entire course even if you feel better."
  },
  "Efferlgan 2-0-2 x 5day": {
    "correctedName": "Efferalgan (Paracetamol) 1000mg",
    "dosageSchedule": "2 tablets in the morning, 0 in the afternoon, 2 tablets in the evening.",
    "duration": "For 5 days, as needed for fever.",
    "advice": "Dissolve tablets in a full glass of water before drinking. Do not exceed the recommended dose."
  }
}"#;

/// Raw drug strings -> map of original string to enriched info
pub fn enrich_medications(medications: &[String]) -> String {
    let input = serde_json::to_string(medications).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"You are an expert pharmacist. For every drug string below:
1. Identify the drug and correct spelling mistakes ("Combret" is likely Coartem, an artemether/lumefantrine combination; "Efferlgan" is Efferalgan, paracetamol).
2. Parse the dosage schedule written as "x-y-z" (morning-afternoon-evening).
3. Parse the duration (e.g. "x 3days").
4. Give patient-friendly advice on how to take it (with food, with water, ...).

Return one JSON object whose keys are the ORIGINAL drug strings and whose values have "correctedName", "dosageSchedule", "duration" and "advice". Return only that object.

EXAMPLE INPUT
["Combret 80/480x 3days 1-0-1", "Efferlgan 2-0-2 x 5day"]

EXAMPLE OUTPUT
{ENRICHMENT_EXAMPLE}

INPUT
{input}"#
    )
}

pub fn polish_summary(text: &str) -> String {
    format!(
        r#"You are a professional medical editor. The text below is a generated summary of a doctor's consultation.
Correct spelling and grammar and improve the sentences so they are clear, professional and reassuring for a patient.
Do not add medical information. Return only the polished text as a single string.

ORIGINAL TEXT
---
{text}
---

POLISHED TEXT"#
    )
}

pub fn format_record(text: &str) -> String {
    format!(
        r#"You are a medical record processor. Convert the text extracted from a patient document into a JSON object with exactly this schema:

{{
  "patientInfo": {{ "name": "string", "age": "number | null", "id": "string | null" }},
  "diagnosis": "string",
  "medications": [ {{ "name": "string", "dosage": "string", "frequency": "string" }} ],
  "nextAppointment": "string (YYYY-MM-DD) | null",
  "notes": "string"
}}

When information is missing use a sensible default: null for age, an empty string for notes, an empty array for medications.

INPUT TEXT
---
{text}
---

Return ONLY the JSON object. No explanations, no markdown fences."#
    )
}

/// Patient voice note transcript -> clinical English
pub fn translate_transcript(text: &str) -> String {
    format!(
        r#"ROLE
You are a medical transcriptionist and translator who turns informal speech into formal clinical English.

CONTEXT
The text is a raw transcription of a patient's voice message. The patient is likely from Cameroon and may speak Cameroonian Pidgin, broken English or a mix of languages. A doctor or nurse will read the result. Do not answer in French.

RULES
1. Keep medical accuracy. Do not guess or add symptoms. "headache" stays "headache".
2. Report symptoms factually, without emotional language.
3. No commentary such as "Here is the translation:".
4. Output only the final English text.
5. If the input is already clear standard English, return it with at most minor grammar fixes.

EXAMPLES
Input: My belle dey hot me bad bad and my head dey turn.
Output: I am experiencing a severe fever and dizziness.

Input: I di cough since three day now, and when I cough, my chest dey pain me.
Output: I have had a cough for the past three days, and I experience chest pain when I cough.

Input: I get pain for my back for down side.
Output: I have pain in my lower back.

PATIENT'S RAW TEXT
"{text}""#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrichment_prompt_embeds_input_as_json() {
        let prompt = enrich_medications(&["Amoxil 500mg 1-1-1 x 7days".to_string()]);
        assert!(prompt.contains(r#"["Amoxil 500mg 1-1-1 x 7days"]"#));
        assert!(prompt.contains("Coartem (Artemether/Lumefantrine) 80/480mg"));
    }

    #[test]
    fn enrichment_example_is_valid_json() {
        let parsed: super::super::model::EnrichmentMap =
            serde_json::from_str(ENRICHMENT_EXAMPLE).unwrap();
        assert!(parsed.contains_key("Efferlgan 2-0-2 x 5day"));
    }

    #[test]
    fn consultation_example_is_valid_json() {
        let parsed: super::super::model::ProcessedConsultation =
            serde_json::from_str(CONSULTATION_EXAMPLE).unwrap();
        assert_eq!(parsed.consultation_items.len(), 3);
        assert_eq!(parsed.total_fee(), 2000.0);
    }
}
