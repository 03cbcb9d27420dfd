//! Acting user taken from the `x-user-id` header.
//!
//! Authentication happens in front of this service; the gateway forwards the
//! authenticated user's id. A request without the header acts anonymously.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use ledgerwise_shared::AppError;
use ledgerwise_shared::types::UserId;

use crate::error::ApiError;

/// Header carrying the acting user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the optional acting user.
///
/// ```ignore
/// async fn handler(ActingUser(user): ActingUser) -> impl IntoResponse {
///     // user: Option<UserId>
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ActingUser(pub Option<UserId>);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(USER_ID_HEADER) else {
            return Ok(Self(None));
        };
        value
            .to_str()
            .ok()
            .and_then(|s| s.trim().parse::<UserId>().ok())
            .map(|id| Self(Some(id)))
            .ok_or_else(|| ApiError(AppError::validation("INVALID_USER_ID", "x-user-id must be a UUID")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use rstest::rstest;
    use uuid::Uuid;

    async fn extract(header: Option<&str>) -> Result<ActingUser, ApiError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        ActingUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_header_is_anonymous() {
        assert!(extract(None).await.unwrap().0.is_none());
    }

    #[tokio::test]
    async fn test_header_is_parsed() {
        let id = Uuid::new_v4();
        let user = extract(Some(&id.to_string())).await.unwrap();
        assert_eq!(user.0, Some(UserId::from_uuid(id)));
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    #[case("12345")]
    #[tokio::test]
    async fn test_malformed_header_is_rejected(#[case] header: &str) {
        let err = extract(Some(header)).await.unwrap_err();
        assert_eq!(err.0.error_code(), "INVALID_USER_ID");
    }
}
