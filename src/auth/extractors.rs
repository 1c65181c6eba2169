use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::jwt::JwtKeys;
use crate::{account::messages, error::ApiError, state::AppState};

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
///
/// Verifies the token and confirms the subject still exists, so a token
/// issued before an account was deleted no longer opens any door.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        if state.users.find_by_id(claims.sub).await?.is_none() {
            return Err(ApiError::unauthorized(messages::USER_NOT_FOUND));
        }

        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::NewUser;
    use axum::http::{header, Request};

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/auth/me");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let request = builder.body(()).expect("request should build");
        request.into_parts().0
    }

    async fn seeded_state() -> (AppState, Uuid) {
        let state = AppState::fake();
        let user = state
            .users
            .create(NewUser {
                email: "auth@example.com".into(),
                password_hash: "$argon2id$fake".into(),
                name: None,
                surname: None,
                sex: None,
                accepted_terms: true,
            })
            .await
            .expect("seed user");
        (state, user.id)
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (state, _) = seeded_state().await;
        let mut parts = parts_with_auth(None);
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Missing Authorization header");
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected() {
        let (state, _) = seeded_state().await;
        let mut parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid Authorization header");
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let (state, _) = seeded_state().await;
        let mut parts = parts_with_auth(Some("Bearer not-a-jwt"));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired token");
    }

    #[tokio::test]
    async fn valid_token_yields_the_user_id() {
        let (state, user_id) = seeded_state().await;
        let token = JwtKeys::from_ref(&state).sign(user_id).expect("sign");
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let AuthUser(extracted) = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .expect("extraction should succeed");
        assert_eq!(extracted, user_id);
    }

    #[tokio::test]
    async fn lowercase_bearer_scheme_is_accepted() {
        let (state, user_id) = seeded_state().await;
        let token = JwtKeys::from_ref(&state).sign(user_id).expect("sign");
        let mut parts = parts_with_auth(Some(&format!("bearer {token}")));
        assert!(AuthUser::from_request_parts(&mut parts, &state)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn valid_token_for_deleted_account_is_rejected() {
        let (state, user_id) = seeded_state().await;
        let token = JwtKeys::from_ref(&state).sign(user_id).expect("sign");
        assert!(state.users.delete(user_id).await.expect("delete"));

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = AuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(err.to_string(), "User not found");
    }
}
