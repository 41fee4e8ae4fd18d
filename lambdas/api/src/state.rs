use std::sync::Arc;

use aws_config::BehaviorVersion;
use domain::{
    appointments::{self, AppointmentRepo, CommandBus},
    consultations::{GenerativeModel, ModelNames, Pipeline, SpeechToText},
    store::{DynamoRepository, ImageStore, MemoryImageStore, MemoryRepository, Repository, S3ImageStore},
};

use crate::{
    clients::{GeminiClient, WhisperClient},
    config::{Config, StoreBackend},
};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn Repository>,
    pub images: Arc<dyn ImageStore>,
    pub model: Arc<dyn GenerativeModel>,
    pub speech: Arc<dyn SpeechToText>,
    pub models: Arc<ModelNames>,
    pub appointments: Arc<dyn CommandBus>,
    pub appointments_repo: AppointmentRepo,
}

impl AppState {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let model = Arc::new(GeminiClient::new(
            &config.gemini_base_url,
            config.gemini_api_key.clone(),
            config.http_timeout,
        )?);
        let speech = Arc::new(WhisperClient::new(
            &config.whisper_url,
            config.huggingface_api_key.clone(),
            config.http_timeout,
        )?);

        let state = match config.store {
            StoreBackend::DynamoDb => {
                let aws = aws_config::defaults(BehaviorVersion::latest()).load().await;
                let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws);
                let s3_client = aws_sdk_s3::Client::new(&aws);

                let appointments_repo = appointments::cqrs::init_repo(dynamodb_client.clone());
                let appointments =
                    appointments::cqrs::init(dynamodb_client.clone(), appointments_repo.clone());

                Self {
                    repo: Arc::new(DynamoRepository::new(dynamodb_client)),
                    images: Arc::new(S3ImageStore::new(s3_client)),
                    model,
                    speech,
                    models: Arc::new(config.models.clone()),
                    appointments,
                    appointments_repo,
                }
            }
            StoreBackend::Memory => {
                tracing::info!("Using in-memory store");
                let (appointments, appointments_repo) = appointments::cqrs::init_in_memory();

                Self {
                    repo: Arc::new(MemoryRepository::default()),
                    images: Arc::new(MemoryImageStore::default()),
                    model,
                    speech,
                    models: Arc::new(config.models.clone()),
                    appointments,
                    appointments_repo,
                }
            }
        };

        Ok(state)
    }

    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(self.model.as_ref(), self.models.as_ref())
    }
}
