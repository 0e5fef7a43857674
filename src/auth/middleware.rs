use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::{verify_token, TokenType};
use crate::config::Config;
use crate::error::AppError;
use crate::AppState;

/// A caller with a verified access token. Journal and profile handlers take
/// this type, never a bare `Session`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone)]
pub enum Session {
    Authenticated(AuthUser),
    Anonymous,
}

impl Session {
    /// A missing, malformed, expired, or non-access token all resolve to
    /// `Anonymous`.
    pub fn from_headers(headers: &HeaderMap, config: &Config) -> Self {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let Some(token) = token else {
            return Session::Anonymous;
        };

        match verify_token(token, config) {
            Ok(data) if data.claims.token_type == TokenType::Access => {
                Session::Authenticated(AuthUser {
                    id: data.claims.sub,
                    username: data.claims.username,
                })
            }
            _ => Session::Anonymous,
        }
    }

    pub fn into_auth_user(self) -> Result<AuthUser, AppError> {
        match self {
            Session::Authenticated(user) => Ok(user),
            Session::Anonymous => Err(AppError::Unauthorized),
        }
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = Session::from_headers(req.headers(), &state.config).into_auth_user()?;

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::create_token_pair;
    use axum::http::HeaderValue;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_no_header_is_anonymous() {
        let config = Config::for_tests();
        let session = Session::from_headers(&HeaderMap::new(), &config);
        assert!(matches!(session, Session::Anonymous));
        assert!(matches!(session.into_auth_user(), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_access_token_authenticates() {
        let config = Config::for_tests();
        let user_id = Uuid::new_v4();
        let pair = create_token_pair(user_id, "sam", &config).unwrap();

        let user = Session::from_headers(&bearer(&pair.access_token), &config)
            .into_auth_user()
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.username, "sam");
    }

    #[test]
    fn test_refresh_token_is_not_a_session() {
        let config = Config::for_tests();
        let pair = create_token_pair(Uuid::new_v4(), "sam", &config).unwrap();
        let session = Session::from_headers(&bearer(&pair.refresh_token), &config);
        assert!(matches!(session, Session::Anonymous));
    }

    #[test]
    fn test_garbage_token_is_anonymous() {
        let config = Config::for_tests();
        let session = Session::from_headers(&bearer("not.a.jwt"), &config);
        assert!(matches!(session, Session::Anonymous));
    }
}
