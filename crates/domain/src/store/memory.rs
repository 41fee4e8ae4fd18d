use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use cqrs_es::{
    persist::{PersistenceError, ViewContext, ViewRepository},
    Aggregate, View,
};
use tokio::sync::RwLock;

use crate::{
    consultations::Consultation,
    digibooks::{Digibook, Profile},
    errors::Error,
};

use super::{ImageStore, Repository};

const MEMORY_SCHEME: &str = "memory://";

#[derive(Default)]
pub struct MemoryRepository {
    profiles: RwLock<HashMap<String, Profile>>,
    digibooks: RwLock<HashMap<String, Digibook>>,
    consultations: RwLock<Vec<Consultation>>,
    operations: AtomicUsize,
}

impl MemoryRepository {
    /// Number of calls made against this repository
    pub fn operations(&self) -> usize {
        self.operations.load(Ordering::Relaxed)
    }

    fn touch(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn load_profile(&self, clerk_id: &str) -> Result<Option<Profile>, Error> {
        self.touch();
        Ok(self.profiles.read().await.get(clerk_id).cloned())
    }

    async fn upsert_profile(&self, profile: Profile) -> Result<(), Error> {
        self.touch();
        self.profiles
            .write()
            .await
            .insert(profile.clerk_id.clone(), profile);
        Ok(())
    }

    async fn find_profile_by_email(&self, email: &str) -> Result<Option<Profile>, Error> {
        self.touch();
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|profile| profile.email == email)
            .cloned())
    }

    async fn load_digibook(&self, user_id: &str) -> Result<Option<Digibook>, Error> {
        self.touch();
        Ok(self.digibooks.read().await.get(user_id).cloned())
    }

    async fn save_digibook(&self, digibook: Digibook) -> Result<(), Error> {
        self.touch();
        self.digibooks
            .write()
            .await
            .insert(digibook.clerk_user_id.clone(), digibook);
        Ok(())
    }

    async fn insert_consultation(&self, consultation: Consultation) -> Result<(), Error> {
        self.touch();
        self.consultations.write().await.push(consultation);
        Ok(())
    }

    async fn list_consultations(&self, user_id: &str) -> Result<Vec<Consultation>, Error> {
        self.touch();
        let mut rows: Vec<Consultation> = self
            .consultations
            .read()
            .await
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[derive(Default)]
pub struct MemoryImageStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub async fn get(&self, url: &str) -> Option<Vec<u8>> {
        let key = url.strip_prefix(MEMORY_SCHEME)?;
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put_image(&self, key: &str, _content_type: &str, bytes: Vec<u8>) -> Result<String, Error> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(format!("{}{}", MEMORY_SCHEME, key))
    }
}

/// Versioned view table kept in process memory.
pub struct MemoryViewRepository<V> {
    views: RwLock<HashMap<String, (V, i64)>>,
}

impl<V> Default for MemoryViewRepository<V> {
    fn default() -> Self {
        Self {
            views: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<V, A> ViewRepository<V, A> for MemoryViewRepository<V>
where
    V: View<A> + Clone,
    A: Aggregate,
{
    async fn load(&self, view_id: &str) -> Result<Option<V>, PersistenceError> {
        Ok(self
            .views
            .read()
            .await
            .get(view_id)
            .map(|(view, _)| view.clone()))
    }

    async fn load_with_context(
        &self,
        view_id: &str,
    ) -> Result<Option<(V, ViewContext)>, PersistenceError> {
        Ok(self.views.read().await.get(view_id).map(|(view, version)| {
            (view.clone(), ViewContext::new(view_id.to_string(), *version))
        }))
    }

    async fn update_view(&self, view: V, context: ViewContext) -> Result<(), PersistenceError> {
        let mut views = self.views.write().await;
        let stored = views.get(&context.view_instance_id).map_or(0, |(_, v)| *v);
        if stored != context.version {
            return Err(PersistenceError::OptimisticLockError);
        }
        views.insert(context.view_instance_id, (view, context.version + 1));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn profile(id: &str, email: &str) -> Profile {
        let now = Utc::now();
        Profile {
            clerk_id: id.to_string(),
            email: email.to_string(),
            full_name: None,
            onboarding_complete: false,
            is_admin: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn finds_profiles_by_exact_email() {
        let repo = MemoryRepository::default();
        repo.upsert_profile(profile("u1", "a@b.cm")).await.unwrap();
        repo.upsert_profile(profile("u2", "c@d.cm")).await.unwrap();

        let found = repo.find_profile_by_email("c@d.cm").await.unwrap().unwrap();
        assert_eq!(found.clerk_id, "u2");
        assert!(repo.find_profile_by_email("C@D.cm").await.unwrap().is_none());
        assert_eq!(repo.operations(), 4);
    }

    #[tokio::test]
    async fn image_urls_resolve_back_to_bytes() {
        let store = MemoryImageStore::default();
        let url = store.put_image("a/b.png", "image/png", vec![1, 2, 3]).await.unwrap();

        assert_eq!(url, "memory://a/b.png");
        assert_eq!(store.get(&url).await, Some(vec![1, 2, 3]));
        assert_eq!(store.get("https://elsewhere/a/b.png").await, None);
    }
}
