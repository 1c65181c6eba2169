use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{jwt::JwtKeys, password},
    directory::{NewUser, ProfileChanges, UserDirectory},
    error::ApiError,
};

use super::{
    dto::{
        AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, PublicUser,
        RegisterRequest, UpdateProfileRequest,
    },
    messages,
};

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 128;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

lazy_static! {
    // Verified against when login hits an unknown email, so the response
    // takes as long as a real verification and does not reveal whether the
    // account exists.
    static ref DUMMY_HASH: String = password::hash_password("dummy-startup-value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bg$dW5rbm93bg".to_string());
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < PASSWORD_MIN_LEN || password.len() > PASSWORD_MAX_LEN {
        return Err(ApiError::validation(format!(
            "Password must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"
        )));
    }
    Ok(())
}

/// Coordinates account operations between the HTTP layer, the password
/// hasher, the token signer and the user directory. Assembled once at
/// startup and cloned into handlers via [`crate::state::AppState`].
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserDirectory>,
    keys: JwtKeys,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserDirectory>, keys: JwtKeys) -> Self {
        Self { users, keys }
    }

    #[instrument(skip(self, request))]
    pub async fn register(&self, mut request: RegisterRequest) -> Result<AuthResponse, ApiError> {
        request.email = normalize_email(&request.email);

        if !is_valid_email(&request.email) {
            warn!(email = %request.email, "invalid email");
            return Err(ApiError::validation("Invalid email"));
        }
        validate_password(&request.password)?;
        if !request.accepted_terms {
            return Err(ApiError::validation("Terms must be accepted"));
        }

        // Friendly early check; the directory's unique constraint stays
        // authoritative if a concurrent registration slips in between.
        if self.users.find_by_email(&request.email).await?.is_some() {
            warn!(email = %request.email, "email already registered");
            return Err(ApiError::conflict(messages::EMAIL_ALREADY_EXISTS));
        }

        let password_hash = password::hash_password_blocking(request.password).await?;
        let user = self
            .users
            .create(NewUser {
                email: request.email,
                password_hash,
                name: request.name,
                surname: request.surname,
                sex: request.sex,
                accepted_terms: request.accepted_terms,
            })
            .await?;

        let access_token = self.keys.sign(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(AuthResponse {
            user: user.into(),
            access_token,
        })
    }

    #[instrument(skip(self, request))]
    pub async fn login(&self, mut request: LoginRequest) -> Result<AuthResponse, ApiError> {
        request.email = normalize_email(&request.email);

        let user = match self.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                // Equalize timing with the real verification path.
                let _ = password::verify_password_blocking(request.password, DUMMY_HASH.clone())
                    .await;
                warn!(email = %request.email, "login attempt for unknown email");
                return Err(ApiError::unauthorized(messages::INVALID_CREDENTIALS));
            }
        };

        let stored_hash = match user.password_hash.clone() {
            Some(hash) => hash,
            None => {
                warn!(user_id = %user.id, "login attempt for account without credential");
                return Err(ApiError::unauthorized(messages::INVALID_CREDENTIALS));
            }
        };

        if !password::verify_password_blocking(request.password, stored_hash).await? {
            warn!(user_id = %user.id, "login invalid password");
            return Err(ApiError::unauthorized(messages::INVALID_CREDENTIALS));
        }

        let access_token = self.keys.sign(user.id)?;
        info!(user_id = %user.id, email = %user.email, "user logged in");
        Ok(AuthResponse {
            user: user.into(),
            access_token,
        })
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> Result<PublicUser, ApiError> {
        match self.users.find_by_id(user_id).await? {
            Some(user) => Ok(user.into()),
            None => Err(ApiError::not_found(messages::USER_NOT_FOUND)),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        request: UpdateProfileRequest,
    ) -> Result<PublicUser, ApiError> {
        let changes = ProfileChanges {
            name: request.name,
            surname: request.surname,
            birth_date: request.birth_date,
            sex: request.sex,
            image_url: request.image_url,
        };

        match self.users.update_profile(user_id, changes).await? {
            Some(user) => {
                info!(user_id = %user.id, "profile updated");
                Ok(user.into())
            }
            None => Err(ApiError::not_found(messages::USER_NOT_FOUND)),
        }
    }

    #[instrument(skip(self, request))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        request: ChangePasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        let user = match self.users.find_by_id(user_id).await? {
            Some(user) => user,
            None => return Err(ApiError::not_found(messages::USER_NOT_FOUND)),
        };

        // Reject an unusable replacement before spending a verification on
        // the current one.
        validate_password(&request.new_password)?;

        let stored_hash = match user.password_hash {
            Some(hash) => hash,
            None => {
                warn!(user_id = %user.id, "password change for account without credential");
                return Err(ApiError::unauthorized(messages::INCORRECT_PASSWORD));
            }
        };

        if !password::verify_password_blocking(request.current_password, stored_hash).await? {
            warn!(user_id = %user.id, "password change with wrong current password");
            return Err(ApiError::unauthorized(messages::INCORRECT_PASSWORD));
        }

        let new_hash = password::hash_password_blocking(request.new_password).await?;
        if self.users.set_password(user_id, new_hash).await?.is_none() {
            return Err(ApiError::not_found(messages::USER_NOT_FOUND));
        }

        // Tokens issued earlier stay valid until their own expiry.
        info!(user_id = %user_id, "password changed");
        Ok(MessageResponse {
            message: messages::PASSWORD_CHANGED,
        })
    }

    #[instrument(skip(self))]
    pub async fn delete_account(&self, user_id: Uuid) -> Result<MessageResponse, ApiError> {
        if !self.users.delete(user_id).await? {
            return Err(ApiError::not_found(messages::USER_NOT_FOUND));
        }

        info!(user_id = %user_id, "account deleted");
        Ok(MessageResponse {
            message: messages::ACCOUNT_DELETED,
        })
    }
}
