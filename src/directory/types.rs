use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record as persisted. Deliberately not `Serialize`. The stored
/// credential must never reach a wire format, so the public shape lives in
/// a separate DTO.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birth_date: Option<Date>,
    pub sex: Option<String>,
    pub image_url: Option<String>,
    pub accepted_terms: bool,
    pub update_date: OffsetDateTime,
    pub created_date: OffsetDateTime,
}

/// Creation payload. The directory assigns the id and both timestamps.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub sex: Option<String>,
    pub accepted_terms: bool,
}

/// Partial profile update. `None` leaves the stored value untouched; any
/// present value is applied, including an empty string.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birth_date: Option<Date>,
    pub sex: Option<String>,
    pub image_url: Option<String>,
}
