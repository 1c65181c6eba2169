use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::directory::UserRecord;

time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Request body for user registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub sex: Option<String>,
    #[serde(default)]
    pub accepted_terms: bool,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for a partial profile update. Every field is optional;
/// only supplied fields change, and `null` counts as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub surname: Option<String>,
    #[serde(default, with = "date_format::option")]
    pub birth_date: Option<Date>,
    pub sex: Option<String>,
    pub image_url: Option<String>,
}

/// Request body for a password change.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Response returned after register or login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: PublicUser,
    pub access_token: String,
}

/// Confirmation payload for operations without a richer result.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Public part of the user returned to the client. The credential never
/// leaves the directory layer; there is no field for it to leak through.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    #[serde(with = "date_format::option")]
    pub birth_date: Option<Date>,
    pub sex: Option<String>,
    pub image_url: Option<String>,
    pub accepted_terms: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub update_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_date: OffsetDateTime,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            email: record.email,
            name: record.name,
            surname: record.surname,
            birth_date: record.birth_date,
            sex: record.sex,
            image_url: record.image_url,
            accepted_terms: record.accepted_terms,
            update_date: record.update_date,
            created_date: record.created_date,
        }
    }
}
