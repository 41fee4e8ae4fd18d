//! Storage ports. DynamoDB/S3 adapters for deployment, in-memory ones for
//! local runs and tests.

use async_trait::async_trait;

use crate::{
    consultations::Consultation,
    digibooks::{Digibook, Profile},
    errors::Error,
};

pub mod dynamo;
pub mod memory;
pub mod s3;

pub use dynamo::DynamoRepository;
pub use memory::{MemoryImageStore, MemoryRepository, MemoryViewRepository};
pub use s3::S3ImageStore;

/// Profiles, digibooks and consultation rows
#[async_trait]
pub trait Repository: Send + Sync {
    async fn load_profile(&self, clerk_id: &str) -> Result<Option<Profile>, Error>;

    async fn upsert_profile(&self, profile: Profile) -> Result<(), Error>;

    /// Exact match on the stored email; callers normalize first.
    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, Error>;

    async fn load_digibook(&self, user_id: &str) -> Result<Option<Digibook>, Error>;

    /// Insert or replace, keyed by user.
    async fn save_digibook(&self, digibook: Digibook) -> Result<(), Error>;

    async fn insert_consultation(&self, consultation: Consultation) -> Result<(), Error>;

    /// Newest first.
    async fn list_consultations(&self, user_id: &str) -> Result<Vec<Consultation>, Error>;
}

/// Object storage for consultation images
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the bytes and returns the URL to persist.
    async fn put_image(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<String, Error>;
}
