use async_trait::async_trait;
use derive_new::new;
use serde_json::Value;

use crate::errors::Error;

use super::{
    capture::ImageData,
    json::{parse_embedded, parse_fenced},
    model::{EnrichmentMap, FormattedRecord, ProcessedConsultation},
    prompts,
};

pub const NO_SPOKEN_INPUT: &str = "Patient did not provide any spoken input.";

/// One call to the hosted generative model
#[derive(Clone, Debug, new)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
    #[new(default)]
    pub image: Option<ImageData>,
    /// Lower the provider's content filters; clinical text trips them
    #[new(value = "false")]
    pub relaxed_safety: bool,
}

impl GenerationRequest {
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }

    pub fn relaxed(mut self) -> Self {
        self.relaxed_safety = true;
        self
    }
}

#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Returns the model's text answer
    async fn generate(&self, request: GenerationRequest) -> Result<String, Error>;
}

#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: Vec<u8>, content_type: &str) -> Result<String, Error>;
}

/// Which hosted model serves each step
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelNames {
    pub extraction: String,
    pub enrichment: String,
    pub polish: String,
    pub translation: String,
}

impl Default for ModelNames {
    fn default() -> Self {
        Self {
            extraction: "gemini-2.0-flash".to_string(),
            enrichment: "gemini-2.5-flash-preview-05-20".to_string(),
            polish: "gemini-1.5-pro-latest".to_string(),
            translation: "gemini-1.5-flash-latest".to_string(),
        }
    }
}

/// Sequences the model calls that turn a consultation paper into a record.
pub struct Pipeline<'a> {
    model: &'a dyn GenerativeModel,
    names: &'a ModelNames,
}

impl<'a> Pipeline<'a> {
    pub fn new(model: &'a dyn GenerativeModel, names: &'a ModelNames) -> Self {
        Self { model, names }
    }

    /// Plain OCR of a document image.
    pub async fn extract_text(&self, image: ImageData) -> Result<String, Error> {
        image.ensure_ocr_supported()?;

        let request = GenerationRequest::new(self.names.extraction.clone(), prompts::OCR.to_string())
            .with_image(image);

        self.model.generate(request).await
    }

    /// Image -> structured consultation, then enrichment of any drug the
    /// extraction call left bare. A failed enrichment fails the whole record.
    pub async fn process_image(&self, image: ImageData) -> Result<ProcessedConsultation, Error> {
        let request = GenerationRequest::new(
            self.names.extraction.clone(),
            prompts::process_consultation(),
        )
        .with_image(image)
        .relaxed();

        let raw = self.model.generate(request).await?;
        let mut consultation: ProcessedConsultation = parse_embedded(&raw)?;

        let pending = consultation.unenriched_drugs();
        if !pending.is_empty() {
            tracing::info!("Enriching {} medications left bare by extraction", pending.len());
            let enrichment = self.enrich_medications(&pending).await?;
            consultation.attach_enrichment(&enrichment);
        }

        tracing::info!(
            "Processed consultation with {} items",
            consultation.consultation_items.len()
        );
        Ok(consultation)
    }

    /// OCR'd text -> structured consultation, no enrichment.
    pub async fn structure_text(&self, text: &str) -> Result<ProcessedConsultation, Error> {
        if text.trim().is_empty() {
            return Err(Error::missing("Text to format is required"));
        }

        let request = GenerationRequest::new(
            self.names.extraction.clone(),
            prompts::structure_consultation(text),
        )
        .relaxed();

        let raw = self.model.generate(request).await?;
        parse_embedded(&raw)
    }

    pub async fn enrich_medications(&self, medications: &[String]) -> Result<EnrichmentMap, Error> {
        if medications.is_empty() {
            return Ok(EnrichmentMap::new());
        }

        let request = GenerationRequest::new(
            self.names.enrichment.clone(),
            prompts::enrich_medications(medications),
        );

        let raw = self.model.generate(request).await?;
        parse_fenced(&raw)
    }

    pub async fn polish_summary(&self, text: &str) -> Result<String, Error> {
        if text.is_empty() {
            return Ok(String::new());
        }

        let request =
            GenerationRequest::new(self.names.polish.clone(), prompts::polish_summary(text))
                .relaxed();

        let polished = self.model.generate(request).await?;
        Ok(polished.trim().to_string())
    }

    pub async fn format_record(&self, text: &str) -> Result<FormattedRecord, Error> {
        if text.trim().is_empty() {
            return Err(Error::missing("Text to format is required"));
        }

        let request =
            GenerationRequest::new(self.names.extraction.clone(), prompts::format_record(text));

        let raw = self.model.generate(request).await?;
        let value: Value = parse_fenced(&raw)?;

        let complete = ["patientInfo", "medications"]
            .iter()
            .all(|key| value.get(key).is_some_and(|v| !v.is_null()));
        if !complete {
            return Err(Error::unparseable(
                "Formatted data is missing required properties.",
            ));
        }

        serde_json::from_value(value)
            .map_err(|e| Error::unparseable(format!("AI returned malformed JSON: {}", e)))
    }

    /// Rewrites a patient's transcribed voice note as clinical English.
    pub async fn translate_transcript(&self, text: &str) -> Result<String, Error> {
        if text.trim().is_empty() {
            return Ok(NO_SPOKEN_INPUT.to_string());
        }

        let request = GenerationRequest::new(
            self.names.translation.clone(),
            prompts::translate_transcript(text),
        );

        let translated = self.model.generate(request).await?;
        Ok(translated.trim().to_string())
    }

    /// Speech-to-text followed by translation.
    pub async fn transcribe_voice_note(
        &self,
        speech: &dyn SpeechToText,
        audio: Vec<u8>,
        content_type: &str,
    ) -> Result<String, Error> {
        let transcript = speech.transcribe(audio, content_type).await?;
        tracing::info!("Transcribed voice note ({} chars)", transcript.len());
        self.translate_transcript(&transcript).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::VecDeque, sync::Mutex};

    use super::*;

    /// Replays canned answers in order and records every request.
    #[derive(Default)]
    pub struct ScriptedModel {
        answers: Mutex<VecDeque<Result<String, Error>>>,
        pub requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedModel {
        pub fn answering(answers: Vec<Result<String, Error>>) -> Self {
            Self {
                answers: Mutex::new(answers.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerativeModel for ScriptedModel {
        async fn generate(&self, request: GenerationRequest) -> Result<String, Error> {
            self.requests.lock().unwrap().push(request);
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(Error::upstream("no scripted answer")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedModel;
    use super::*;

    const EXTRACTED: &str = r#"Here you go:
    {
      "patientEmail": "patient@example.cm",
      "patientPhoneNumber": null,
      "doctorName": "Tonyuy Ortu",
      "complaint": "High fever",
      "consultationItems": [
        { "labWork": "Test", "labResults": "T=38.9", "drugs": null, "fee": 0 },
        { "labWork": "Malaria", "labResults": "positive MP", "drugs": "Combret 80/480x 3days 1-0-1", "fee": 2000 }
      ],
      "summaryNotes": "Malaria."
    }"#;

    const ENRICHED: &str = r#"```json
    { "Combret 80/480x 3days 1-0-1": { "correctedName": "Coartem", "dosageSchedule": "1-0-1", "duration": "For 3 days.", "advice": "Take with food." } }
    ```"#;

    fn image() -> ImageData {
        ImageData::parse("data:image/png;base64,aGVsbG8=").unwrap()
    }

    #[tokio::test]
    async fn process_image_enriches_bare_drugs() {
        let model = ScriptedModel::answering(vec![Ok(EXTRACTED.to_string()), Ok(ENRICHED.to_string())]);
        let names = ModelNames::default();

        let consultation = Pipeline::new(&model, &names).process_image(image()).await.unwrap();

        assert_eq!(consultation.doctor_name.as_deref(), Some("Tonyuy Ortu"));
        let info = consultation.consultation_items[1].enriched_info.as_ref().unwrap();
        assert_eq!(info.corrected_name, "Coartem");

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].image.is_some());
        assert!(requests[0].relaxed_safety);
        assert_eq!(requests[1].model, names.enrichment);
        assert!(requests[1].prompt.contains("Combret 80/480x 3days 1-0-1"));
    }

    #[tokio::test]
    async fn failed_enrichment_fails_the_record() {
        let model = ScriptedModel::answering(vec![
            Ok(EXTRACTED.to_string()),
            Err(Error::upstream("quota exceeded")),
        ]);
        let names = ModelNames::default();

        let err = Pipeline::new(&model, &names).process_image(image()).await.unwrap_err();
        assert_eq!(err, Error::upstream("quota exceeded"));
    }

    #[tokio::test]
    async fn note_without_a_table_has_no_items() {
        let model = ScriptedModel::answering(vec![Ok(
            r#"Here it is: {"doctorName":"Dr X","summaryNotes":"Cough."}"#.to_string(),
        )]);
        let names = ModelNames::default();

        let consultation = Pipeline::new(&model, &names).process_image(image()).await.unwrap();

        assert_eq!(consultation.doctor_name.as_deref(), Some("Dr X"));
        assert!(consultation.consultation_items.is_empty());
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn refusal_without_json_is_unparseable() {
        let model = ScriptedModel::answering(vec![Ok("I can't help with that.".to_string())]);
        let names = ModelNames::default();

        let err = Pipeline::new(&model, &names).process_image(image()).await.unwrap_err();
        assert!(matches!(err, Error::UnparseableOutput { .. }));
        assert!(err.to_string().contains("I can't help with that."));
    }

    #[tokio::test]
    async fn empty_inputs_skip_the_model() {
        let model = ScriptedModel::default();
        let names = ModelNames::default();
        let pipeline = Pipeline::new(&model, &names);

        assert!(pipeline.enrich_medications(&[]).await.unwrap().is_empty());
        assert_eq!(pipeline.polish_summary("").await.unwrap(), "");
        assert_eq!(pipeline.translate_transcript("  ").await.unwrap(), NO_SPOKEN_INPUT);
        assert_eq!(
            pipeline.structure_text("").await.unwrap_err(),
            Error::missing("Text to format is required")
        );
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn ocr_checks_mime_before_calling() {
        let model = ScriptedModel::default();
        let names = ModelNames::default();
        let gif = ImageData::parse("data:image/gif;base64,R0lG").unwrap();

        let err = Pipeline::new(&model, &names).extract_text(gif).await.unwrap_err();
        assert_eq!(err, Error::validation("Unsupported MIME type: image/gif"));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn format_record_requires_core_sections() {
        let model = ScriptedModel::answering(vec![
            Ok(r#"{"diagnosis": "Malaria", "notes": ""}"#.to_string()),
            Ok(r#"```json
            {"patientInfo": {"name": "Ngwa", "age": 34, "id": null}, "diagnosis": "Malaria", "medications": [], "nextAppointment": null, "notes": ""}
            ```"#
                .to_string()),
        ]);
        let names = ModelNames::default();
        let pipeline = Pipeline::new(&model, &names);

        let err = pipeline.format_record("some text").await.unwrap_err();
        assert_eq!(err, Error::unparseable("Formatted data is missing required properties."));

        let record = pipeline.format_record("some text").await.unwrap();
        assert_eq!(record.patient_info.age, Some(34));
    }
}
