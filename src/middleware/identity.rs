use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

use crate::error::AppError;

/// Header carrying the authenticated user's id, set by the auth gateway
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying whether that user has verified their email
pub const EMAIL_VERIFIED_HEADER: &str = "x-user-email-verified";

/// Identity of the caller as asserted by the upstream auth gateway
///
/// Tokens are validated before requests reach this service; only the resulting
/// identity headers are read here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email_verified: bool,
}

impl AuthenticatedUser {
    fn from_parts(parts: &Parts) -> Result<Self, AppError> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or_else(|| AppError::Unauthorized("Could not validate credentials".to_string()))?;

        let email_verified = parts
            .headers
            .get(EMAIL_VERIFIED_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self { id, email_verified })
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_parts(parts)
    }
}

/// An authenticated caller whose email address is verified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedUser(pub Uuid);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for VerifiedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_parts(parts)?;
        if !user.email_verified {
            return Err(AppError::Forbidden(
                "Please verify your email to access this feature".to_string(),
            ));
        }
        Ok(VerifiedUser(user.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/ratings");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn test_missing_user_id_is_unauthorized() {
        let mut parts = parts(&[]);
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_malformed_user_id_is_unauthorized() {
        let mut parts = parts(&[(USER_ID_HEADER, "not-a-uuid")]);
        let result = AuthenticatedUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_authenticated_user_defaults_to_unverified() {
        let id = Uuid::new_v4();
        let mut parts = parts(&[(USER_ID_HEADER, &id.to_string())]);
        let user = AuthenticatedUser::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(user.id, id);
        assert!(!user.email_verified);
    }

    #[tokio::test]
    async fn test_verified_user_requires_verification() {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let mut unverified = parts(&[(USER_ID_HEADER, &id_str), (EMAIL_VERIFIED_HEADER, "false")]);
        let result = VerifiedUser::from_request_parts(&mut unverified, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let mut verified = parts(&[(USER_ID_HEADER, &id_str), (EMAIL_VERIFIED_HEADER, "TRUE")]);
        let user = VerifiedUser::from_request_parts(&mut verified, &())
            .await
            .unwrap();
        assert_eq!(user, VerifiedUser(id));
    }
}
