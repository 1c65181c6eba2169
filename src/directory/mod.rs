use async_trait::async_trait;
use uuid::Uuid;

mod memory;
mod postgres;
mod types;

pub use memory::InMemoryDirectory;
pub use postgres::PgUserDirectory;
pub use types::{NewUser, ProfileChanges, UserRecord};

/// Failure modes of the persistence boundary. Email uniqueness is owned by
/// the backend (unique index in PostgreSQL, map scan in memory), so a
/// violated constraint surfaces here as `DuplicateEmail` rather than as an
/// opaque database error.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Persistence boundary for user records. The account service and the auth
/// extractor depend on this trait only; backends are swapped at composition
/// time.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> DirectoryResult<Option<UserRecord>>;

    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<UserRecord>>;

    /// Inserts a record, assigning id and timestamps. Fails with
    /// [`DirectoryError::DuplicateEmail`] when the email is already taken.
    async fn create(&self, user: NewUser) -> DirectoryResult<UserRecord>;

    /// Applies the supplied fields and refreshes `update_date`. Returns
    /// `None` when no record matches.
    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> DirectoryResult<Option<UserRecord>>;

    /// Replaces the stored credential and refreshes `update_date`. Returns
    /// `None` when no record matches.
    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> DirectoryResult<Option<UserRecord>>;

    /// Hard delete. Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> DirectoryResult<bool>;
}
