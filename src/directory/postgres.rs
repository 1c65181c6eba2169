use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::{DirectoryError, DirectoryResult, NewUser, ProfileChanges, UserDirectory, UserRecord};

/// PostgreSQL-backed directory. Ids come from `gen_random_uuid()`,
/// timestamps from the database clock, and email uniqueness from the unique
/// index created by the baseline migration.
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn backend(err: sqlx::Error) -> DirectoryError {
    DirectoryError::Backend(err.into())
}

fn create_error(err: sqlx::Error) -> DirectoryError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return DirectoryError::DuplicateEmail;
        }
    }
    backend(err)
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self), fields(user_id = %id), name = "db_find_user")]
    async fn find_by_id(&self, id: Uuid) -> DirectoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, name, surname, birth_date, sex, image_url,
                   accepted_terms, update_date, created_date
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(user)
    }

    #[instrument(skip(self, email), name = "db_find_user_by_email")]
    async fn find_by_email(&self, email: &str) -> DirectoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, email, password_hash, name, surname, birth_date, sex, image_url,
                   accepted_terms, update_date, created_date
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(user)
    }

    #[instrument(skip(self, user), fields(email = %user.email), name = "db_create_user")]
    async fn create(&self, user: NewUser) -> DirectoryResult<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (email, password_hash, name, surname, sex, accepted_terms)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, name, surname, birth_date, sex, image_url,
                      accepted_terms, update_date, created_date
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.sex)
        .bind(user.accepted_terms)
        .fetch_one(&self.pool)
        .await
        .map_err(create_error)?;
        Ok(record)
    }

    #[instrument(skip(self, changes), fields(user_id = %id), name = "db_update_profile")]
    async fn update_profile(
        &self,
        id: Uuid,
        changes: ProfileChanges,
    ) -> DirectoryResult<Option<UserRecord>> {
        // COALESCE keeps the stored value for absent fields; clearing a
        // column to NULL is not part of this operation's contract.
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                surname = COALESCE($3, surname),
                birth_date = COALESCE($4, birth_date),
                sex = COALESCE($5, sex),
                image_url = COALESCE($6, image_url),
                update_date = now()
            WHERE id = $1
            RETURNING id, email, password_hash, name, surname, birth_date, sex, image_url,
                      accepted_terms, update_date, created_date
            "#,
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.surname)
        .bind(changes.birth_date)
        .bind(&changes.sex)
        .bind(&changes.image_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(user)
    }

    #[instrument(skip(self, password_hash), fields(user_id = %id), name = "db_set_password")]
    async fn set_password(
        &self,
        id: Uuid,
        password_hash: String,
    ) -> DirectoryResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users
            SET password_hash = $2,
                update_date = now()
            WHERE id = $1
            RETURNING id, email, password_hash, name, surname, birth_date, sex, image_url,
                      accepted_terms, update_date, created_date
            "#,
        )
        .bind(id)
        .bind(&password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend)?;
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_delete_user")]
    async fn delete(&self, id: Uuid) -> DirectoryResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }
}
