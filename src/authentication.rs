use crate::errors::RequestError;
use anyhow::{Context, Result};
use argon2::PasswordVerifier;
use argon2::{password_hash::SaltString, Argon2, PasswordHash};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const SESSION_COOKIE: &str = "novelry_session";
pub const CSRF_HEADER: &str = "x-csrf-token";

const SESSION_IDLE_DURATION: time::Duration = time::Duration::days(7);

pub const ROLE_ADMINISTRATOR: &str = "Administrator";
pub const ROLE_MODERATOR: &str = "Moderator";
pub const ROLE_READER: &str = "Reader";

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: i64,
    name: String,
    role: String,
    csrf: String,
    exp: i64,
}

/// Identity carried by the session cookie, threaded into handlers as an
/// explicit value rather than read from ambient state.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub csrf: String,
}

impl SessionUser {
    pub fn is_staff(&self) -> bool {
        self.role == ROLE_ADMINISTRATOR || self.role == ROLE_MODERATOR
    }
}

/// Optional session: readers may browse anonymously.
pub struct MaybeUser(pub Option<SessionUser>);

impl MaybeUser {
    pub fn get_id(&self) -> Option<i64> {
        self.0.as_ref().map(|u| u.id)
    }
}

/// Required session.
pub struct AuthUser(pub SessionUser);

/// Required Administrator or Moderator session. This is the single
/// authorization predicate for the whole back office; it rejects before any
/// handler logic runs.
pub struct StaffUser(pub SessionUser);

fn session_from_headers(headers: &HeaderMap) -> Option<SessionUser> {
    let header = headers.get(header::COOKIE)?.to_str().ok()?;
    let token = header.split(';').map(str::trim).find_map(|pair| {
        pair.strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
    })?;
    match verify_session_token(token) {
        Ok(user) => Some(user),
        Err(_) => {
            // Stale cookies are routine under a 7-day idle timeout; treat
            // them as a logged-out request instead of failing it.
            tracing::debug!("ignoring invalid session cookie");
            None
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_from_headers(&parts.headers)))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match session_from_headers(&parts.headers) {
            Some(user) => Ok(AuthUser(user)),
            None => Err(RequestError::NotAuthorized("You must be signed in.")),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync + 'static,
{
    type Rejection = RequestError;
    async fn from_request_parts(
        parts: &mut Parts,
        _: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        match session_from_headers(&parts.headers) {
            Some(user) if user.is_staff() => Ok(StaffUser(user)),
            _ => Err(RequestError::Denied(
                "You do not have permission to access the admin panel.",
            )),
        }
    }
}

/// Anti-forgery guard over every state-changing route: a request that
/// carries a session must also present the session's CSRF nonce in a header.
/// Requests without a session fall through to the handlers' own auth checks.
pub async fn csrf_guard<B>(req: Request<B>, next: Next<B>) -> Result<Response, RequestError> {
    if !req.method().is_safe() {
        if let Some(session) = session_from_headers(req.headers()) {
            let presented = req.headers().get(CSRF_HEADER).and_then(|v| v.to_str().ok());
            if presented != Some(session.csrf.as_str()) {
                return Err(RequestError::Forbidden(
                    "Missing or invalid anti-forgery token.",
                ));
            }
        }
    }
    Ok(next.run(req).await)
}

pub fn issue_session_token(id: i64, username: &str, role: &str) -> Result<(String, String)> {
    let jwt_secret = std::env::var("JWT_SECRET").context("Failed to get JWT_SECRET")?;
    let csrf: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    let expiry_date = OffsetDateTime::now_utc() + SESSION_IDLE_DURATION;
    let claims = SessionClaims {
        sub: id,
        name: username.to_owned(),
        role: role.to_owned(),
        csrf: csrf.clone(),
        exp: expiry_date.unix_timestamp(),
    };

    let token = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .context("Failed to sign session token")?;
    Ok((token, csrf))
}

pub fn verify_session_token(token: &str) -> Result<SessionUser, RequestError> {
    let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| RequestError::ServerError)?;
    let token_data = jsonwebtoken::decode::<SessionClaims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_ref()),
        &jsonwebtoken::Validation::default(),
    )
    .map_err(|_| RequestError::NotAuthorized("Session expired"))?;
    let claims = token_data.claims;
    if claims.exp < OffsetDateTime::now_utc().unix_timestamp() {
        return Err(RequestError::NotAuthorized("Session expired"));
    }
    Ok(SessionUser {
        id: claims.sub,
        username: claims.name,
        role: claims.role,
        csrf: claims.csrf,
    })
}

/// `Set-Cookie` value establishing the session: HttpOnly, essential, 7-day
/// idle timeout.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_IDLE_DURATION.whole_seconds()
    )
}

pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

pub async fn verify_password_argon2(password: String, hash: String) -> Result<bool> {
    tokio::task::spawn_blocking(move || {
        let hash = PasswordHash::new(hash.as_str())
            .map_err(|_| anyhow::anyhow!("Failed to verify password"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &hash)
            .is_ok())
    })
    .await
    .context("Failed to verify password")?
}

pub async fn hash_password_argon2(password: String) -> Result<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand::thread_rng());
        let hash = PasswordHash::generate(Argon2::default(), password, salt.as_salt())
            .map_err(|_| anyhow::anyhow!("Failed to hash password"))?;
        Ok(hash.to_string())
    })
    .await
    .context("Failed to hash password")?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_token_round_trip() {
        std::env::set_var("JWT_SECRET", "test-secret");
        let (token, csrf) = issue_session_token(7, "ana", ROLE_READER).unwrap();
        let user = verify_session_token(&token).unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.username, "ana");
        assert_eq!(user.role, ROLE_READER);
        assert_eq!(user.csrf, csrf);
        assert!(!user.is_staff());
    }

    #[tokio::test]
    async fn password_hash_round_trip() {
        let hash = hash_password_argon2("hunter2".to_string()).await.unwrap();
        assert!(verify_password_argon2("hunter2".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!verify_password_argon2("hunter3".to_string(), hash)
            .await
            .unwrap());
    }
}
