//! Caller identity from gateway-forwarded headers.
//!
//! The API trusts the gateway to have authenticated the user; identity
//! arrives as `X-User-Id` (UUID) and `X-User-Role` headers.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::UserId;

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "X-User-Id";
pub const USER_ROLE_HEADER: &str = "X-User-Role";

/// Closed set of caller roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Owner,
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl Identity {
    /// Rejects callers that are not customers.
    pub fn require_customer(&self) -> Result<UserId, ApiError> {
        match self.role {
            Role::Customer => Ok(self.user_id),
            Role::Owner => Err(ApiError::Forbidden("customer role required")),
        }
    }

    /// Rejects callers that are not restaurant owners.
    pub fn require_owner(&self) -> Result<UserId, ApiError> {
        match self.role {
            Role::Owner => Ok(self.user_id),
            Role::Customer => Err(ApiError::Forbidden("owner role required")),
        }
    }
}

fn parse_identity(headers: &HeaderMap) -> Result<Identity, ApiError> {
    let raw_id = headers
        .get(USER_ID_HEADER)
        .ok_or(ApiError::Unauthorized("missing X-User-Id header"))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("unreadable X-User-Id header"))?;
    let user_id =
        UserId::parse(raw_id).map_err(|_| ApiError::Unauthorized("X-User-Id is not a UUID"))?;

    let raw_role = headers
        .get(USER_ROLE_HEADER)
        .ok_or(ApiError::Unauthorized("missing X-User-Role header"))?
        .to_str()
        .map_err(|_| ApiError::Unauthorized("unreadable X-User-Role header"))?;
    // Unknown role values are a client error, not an auth failure.
    let role = match raw_role {
        "customer" => Role::Customer,
        "owner" => Role::Owner,
        other => {
            return Err(ApiError::BadRequest(format!("unknown role: {other}")));
        }
    };

    Ok(Identity { user_id, role })
}

impl<S: Send + Sync> FromRequestParts<S> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_identity(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(id: Option<&str>, role: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(id) = id {
            map.insert(USER_ID_HEADER, HeaderValue::from_str(id).unwrap());
        }
        if let Some(role) = role {
            map.insert(USER_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
        }
        map
    }

    #[test]
    fn parses_customer_identity() {
        let user = UserId::new();
        let identity =
            parse_identity(&headers(Some(&user.to_string()), Some("customer"))).unwrap();
        assert_eq!(identity.user_id, user);
        assert_eq!(identity.role, Role::Customer);
    }

    #[test]
    fn missing_headers_are_unauthorized() {
        assert!(matches!(
            parse_identity(&headers(None, Some("customer"))).unwrap_err(),
            ApiError::Unauthorized(_)
        ));
        let user = UserId::new().to_string();
        assert!(matches!(
            parse_identity(&headers(Some(&user), None)).unwrap_err(),
            ApiError::Unauthorized(_)
        ));
    }

    #[test]
    fn malformed_user_id_is_unauthorized() {
        assert!(matches!(
            parse_identity(&headers(Some("not-a-uuid"), Some("customer"))).unwrap_err(),
            ApiError::Unauthorized(_)
        ));
    }

    #[test]
    fn unknown_role_is_a_bad_request() {
        let user = UserId::new().to_string();
        assert!(matches!(
            parse_identity(&headers(Some(&user), Some("admin"))).unwrap_err(),
            ApiError::BadRequest(_)
        ));
    }

    #[test]
    fn role_gates() {
        let identity = Identity {
            user_id: UserId::new(),
            role: Role::Customer,
        };
        assert!(identity.require_customer().is_ok());
        assert!(matches!(
            identity.require_owner().unwrap_err(),
            ApiError::Forbidden(_)
        ));
    }
}
