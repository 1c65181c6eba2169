use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DirectoryError, DirectoryResult, NewUser, ProfileChanges, UserDirectory, UserRecord};

/// Hash-map directory with the same contract as the PostgreSQL backend.
/// Backs the unit tests; nothing is durable.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl InMemoryDirectory {
    /// Seeds a record as-is, bypassing the creation contract. Lets tests
    /// stage states the service cannot produce, such as an account with no
    /// stored credential.
    pub(crate) async fn insert_record(&self, record: UserRecord) {
        self.users.write().await.insert(record.id, record);
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_id(&self, id: Uuid) -> DirectoryResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> DirectoryResult<UserRecord> {
        // Uniqueness check and insert happen under one write guard, so two
        // racing creates cannot both pass the scan.
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(DirectoryError::DuplicateEmail);
        }

        let now = OffsetDateTime::now_utc();
        let record = UserRecord {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: Some(user.password_hash),
            name: user.name,
            surname: user.surname,
            birth_date: None,
            sex: user.sex,
            image_url: None,
            accepted_terms: user.accepted_terms,
            update_date: now,
            created_date: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> DirectoryResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            record.name = Some(name);
        }
        if let Some(surname) = changes.surname {
            record.surname = Some(surname);
        }
        if let Some(birth_date) = changes.birth_date {
            record.birth_date = Some(birth_date);
        }
        if let Some(sex) = changes.sex {
            record.sex = Some(sex);
        }
        if let Some(image_url) = changes.image_url {
            record.image_url = Some(image_url);
        }
        record.update_date = OffsetDateTime::now_utc();
        Ok(Some(record.clone()))
    }

    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> DirectoryResult<Option<UserRecord>> {
        let mut users = self.users.write().await;
        let Some(record) = users.get_mut(&id) else {
            return Ok(None);
        };
        record.password_hash = Some(password_hash);
        record.update_date = OffsetDateTime::now_utc();
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: Uuid) -> DirectoryResult<bool> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}
